//! A committed reward batch held on the JS side.

use chrono::NaiveDate;
use reward_merkle::{BatchOptions, DistributionBatch, LeafOrder, RewardKey, RewardLeafRecord};
use wasm_bindgen::prelude::*;

use crate::state::{from_js, to_js, BatchInfo};

/// One day's rewards committed under a single root.
#[wasm_bindgen]
pub struct RewardBatch {
    /// The committed records and their tree.
    batch: DistributionBatch,
    /// Ordering policy used at commit time.
    order: LeafOrder,
}

#[wasm_bindgen]
impl RewardBatch {
    /// Commit a list of reward records.
    ///
    /// # Arguments
    /// * `records` - Array of `{miner_id, user_id, reward_date, user_btc, net_btc}`
    /// * `by_key` - Sort by (miner, date, user) before hashing instead of
    ///   keeping the array order
    #[wasm_bindgen(constructor)]
    pub fn new(records: JsValue, by_key: bool) -> Result<RewardBatch, JsValue> {
        let records: Vec<RewardLeafRecord> = from_js(records, "reward records")?;
        let order = if by_key { LeafOrder::ByKey } else { LeafOrder::AsGiven };

        let batch = DistributionBatch::commit(records, &BatchOptions::default().with_order(order))
            .map_err(|e| JsValue::from_str(&format!("Cannot commit batch: {}", e)))?;

        Ok(RewardBatch { batch, order })
    }

    /// Root as `0x` hex, or `"0x"` when the batch is empty.
    #[wasm_bindgen(getter)]
    pub fn root(&self) -> String {
        self.batch.hex_root()
    }

    /// Number of committed records.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    /// Proof bundle for a miner's reward on a date, or `null`.
    ///
    /// # Arguments
    /// * `miner_id` - The miner identifier
    /// * `reward_date` - The distribution date as `YYYY-MM-DD`
    #[wasm_bindgen]
    pub fn proof_for(&self, miner_id: &str, reward_date: &str) -> Result<JsValue, JsValue> {
        let date: NaiveDate = reward_date
            .parse()
            .map_err(|e| JsValue::from_str(&format!("Invalid reward date: {}", e)))?;

        match self.batch.proof_for(&RewardKey::new(miner_id, date)) {
            Some(proof) => to_js(&proof),
            None => Ok(JsValue::NULL),
        }
    }

    /// Batch summary for display.
    #[wasm_bindgen]
    pub fn info(&self) -> Result<JsValue, JsValue> {
        BatchInfo::new(&self.batch, self.order.name()).to_js()
    }

    /// Root, leaves and every layer, for tree visualisations.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.batch.tree().snapshot())
    }
}
