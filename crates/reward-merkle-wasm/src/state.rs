//! Plain data handed across the JS boundary.

use reward_merkle::{DistributionBatch, MerkleProof};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Summary of a committed batch for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfo {
    /// Root as `0x` hex, `"0x"` when the batch is empty.
    pub root: String,
    /// Number of reward records.
    pub leaves: usize,
    /// Layers above the leaves.
    pub depth: usize,
    /// Ordering policy the batch was committed with.
    pub order: String,
}

impl BatchInfo {
    pub fn new(batch: &DistributionBatch, order: &str) -> Self {
        BatchInfo {
            root: batch.hex_root(),
            leaves: batch.len(),
            depth: batch.tree().depth(),
            order: order.to_string(),
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        to_js(self)
    }
}

/// Outcome of checking a proof, with the recomputed leaf for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationInfo {
    pub valid: bool,
    pub leaf: String,
    pub root: String,
    pub index: usize,
    pub siblings: usize,
}

impl VerificationInfo {
    pub fn new(proof: &MerkleProof, valid: bool) -> Self {
        VerificationInfo {
            valid,
            leaf: proof.leaf.to_prefixed_hex(),
            root: proof.root.to_prefixed_hex(),
            index: proof.index,
            siblings: proof.proof.len(),
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        to_js(self)
    }
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}
