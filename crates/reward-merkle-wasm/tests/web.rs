//! Browser-side bindings, run with `wasm-pack test`.

#![cfg(target_arch = "wasm32")]

use reward_merkle_wasm::verify::{hash_leaf, verify_proof, verify_reward};
use reward_merkle_wasm::RewardBatch;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[derive(Serialize)]
struct Row {
    miner_id: &'static str,
    user_id: &'static str,
    reward_date: &'static str,
    user_btc: &'static str,
    net_btc: &'static str,
}

fn row(miner_id: &'static str) -> Row {
    Row {
        miner_id,
        user_id: "user-1",
        reward_date: "2024-01-01",
        user_btc: "0.00012345",
        net_btc: "0.00011111",
    }
}

fn js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap()
}

#[wasm_bindgen_test]
fn hash_leaf_matches_core() {
    assert_eq!(
        hash_leaf(js(&row("miner-A"))).unwrap(),
        "0x09177c16e9379e40347f9efea4f9b9d868da7242979280caf09c47d68721b954"
    );
}

#[wasm_bindgen_test]
fn batch_issues_verifiable_proofs() {
    let rows = vec![row("A"), row("B"), row("C")];
    let batch = RewardBatch::new(js(&rows), false).unwrap();
    assert_eq!(batch.len(), 3);

    let bundle = batch.proof_for("C", "2024-01-01").unwrap();
    assert!(verify_reward(js(&row("C")), bundle.clone()).unwrap());
    assert!(!verify_reward(js(&row("B")), bundle).unwrap());

    assert!(batch.proof_for("Z", "2024-01-01").unwrap().is_null());
    assert!(batch.proof_for("C", "01/01/2024").is_err());
}

#[wasm_bindgen_test]
fn verify_proof_checks_hex() {
    let leaf = hash_leaf(js(&row("A"))).unwrap();
    let empty: Vec<String> = Vec::new();

    assert!(verify_proof(&leaf, js(&empty), &leaf, 0).unwrap());
    assert!(verify_proof("0x12", js(&empty), &leaf, 0).is_err());
}

#[wasm_bindgen_test]
fn empty_batch_has_sentinel_root() {
    let rows: Vec<Row> = Vec::new();
    let batch = RewardBatch::new(js(&rows), true).unwrap();
    assert_eq!(batch.root(), "0x");
}
