//! Stateless hashing and verification helpers for the browser.

use reward_merkle::{Digest, MerkleProof, RewardLeafRecord};
use wasm_bindgen::prelude::*;

use crate::state::{from_js, VerificationInfo};

/// Leaf digest of a reward record, as `0x` hex.
///
/// # Arguments
/// * `record` - `{miner_id, user_id, reward_date, user_btc, net_btc}`;
///   amounts may be numbers or 8-digit decimal strings
#[wasm_bindgen]
pub fn hash_leaf(record: JsValue) -> Result<String, JsValue> {
    let record: RewardLeafRecord = from_js(record, "reward record")?;
    let leaf = reward_merkle::hash_leaf(&record)
        .map_err(|e| JsValue::from_str(&format!("{}", e)))?;
    Ok(leaf.to_prefixed_hex())
}

/// Check a leaf digest against a root using its sibling path.
///
/// Returns `false` for a proof that does not match; errors only when the
/// inputs are not well-formed hex digests.
#[wasm_bindgen]
pub fn verify_proof(leaf: &str, proof: JsValue, root: &str, index: u32) -> Result<bool, JsValue> {
    let leaf = parse_digest(leaf)?;
    let root = parse_digest(root)?;
    let siblings: Vec<Digest> = from_js(proof, "proof path")?;

    Ok(reward_merkle::verify(&leaf, &siblings, &root, index as usize))
}

/// Check that a reward record is committed under a proof bundle's root.
///
/// # Arguments
/// * `record` - The reward record as shown to the user
/// * `bundle` - `{leaf, proof, root, index}` as issued by the backend
#[wasm_bindgen]
pub fn verify_reward(record: JsValue, bundle: JsValue) -> Result<bool, JsValue> {
    let record: RewardLeafRecord = from_js(record, "reward record")?;
    let bundle: MerkleProof = from_js(bundle, "proof bundle")?;

    bundle
        .verify_record(&record)
        .map_err(|e| JsValue::from_str(&format!("{}", e)))
}

/// Verify a proof bundle on its own and describe the result.
#[wasm_bindgen]
pub fn inspect_proof(bundle: JsValue) -> Result<JsValue, JsValue> {
    let bundle: MerkleProof = from_js(bundle, "proof bundle")?;
    VerificationInfo::new(&bundle, bundle.verify()).to_js()
}

fn parse_digest(text: &str) -> Result<Digest, JsValue> {
    text.parse()
        .map_err(|e| JsValue::from_str(&format!("{}", e)))
}
