//! Reward records and their canonical leaf encoding.
//!
//! A leaf is the SHA256 of a compact JSON object with a fixed key order:
//!
//! ```text
//! {"miner_id":"..","user_id":"..","reward_date":"YYYY-MM-DD","user_btc":"0.00000000","net_btc":"0.00000000"}
//! ```
//!
//! Amounts are strings with exactly eight fractional digits. Any verifier
//! must reproduce these bytes exactly or its roots will not match.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amount::BtcAmount;
use crate::error::{Error, Result};
use crate::hash::{Digest, MerkleHasher, Sha256Hasher};

/// Date layout used inside the canonical encoding.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One (miner, user) reward for one distribution date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardLeafRecord {
    pub miner_id: String,
    pub user_id: String,
    pub reward_date: NaiveDate,
    pub user_btc: BtcAmount,
    pub net_btc: BtcAmount,
}

/// Business key identifying a record within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RewardKey {
    pub miner_id: String,
    pub reward_date: NaiveDate,
}

impl RewardKey {
    pub fn new(miner_id: impl Into<String>, reward_date: NaiveDate) -> Self {
        RewardKey {
            miner_id: miner_id.into(),
            reward_date,
        }
    }

    /// Whether `record` carries this key.
    pub fn matches(&self, record: &RewardLeafRecord) -> bool {
        record.miner_id == self.miner_id && record.reward_date == self.reward_date
    }
}

impl RewardLeafRecord {
    pub fn new(
        miner_id: impl Into<String>,
        user_id: impl Into<String>,
        reward_date: NaiveDate,
        user_btc: BtcAmount,
        net_btc: BtcAmount,
    ) -> Self {
        RewardLeafRecord {
            miner_id: miner_id.into(),
            user_id: user_id.into(),
            reward_date,
            user_btc,
            net_btc,
        }
    }

    /// Build a record from floating point amounts as delivered by the
    /// reward engine. Non-finite or out-of-range values are rejected.
    pub fn from_btc(
        miner_id: impl Into<String>,
        user_id: impl Into<String>,
        reward_date: NaiveDate,
        user_btc: f64,
        net_btc: f64,
    ) -> Result<Self> {
        let user_btc =
            BtcAmount::from_btc(user_btc).map_err(|e| Error::invalid_field("user_btc", e.to_string()))?;
        let net_btc =
            BtcAmount::from_btc(net_btc).map_err(|e| Error::invalid_field("net_btc", e.to_string()))?;
        Ok(Self::new(miner_id, user_id, reward_date, user_btc, net_btc))
    }

    pub fn key(&self) -> RewardKey {
        RewardKey::new(self.miner_id.clone(), self.reward_date)
    }

    /// Reject records that are missing an identifier.
    pub fn validate(&self) -> Result<()> {
        if self.miner_id.trim().is_empty() {
            return Err(Error::invalid_field("miner_id", "must not be empty"));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::invalid_field("user_id", "must not be empty"));
        }
        Ok(())
    }
}

/// Field order here is the wire order; do not reorder.
#[derive(Serialize)]
struct CanonicalLeaf<'a> {
    miner_id: &'a str,
    user_id: &'a str,
    reward_date: String,
    user_btc: String,
    net_btc: String,
}

/// Render a record in its canonical form.
pub fn encode_leaf(record: &RewardLeafRecord) -> Result<String> {
    record.validate()?;

    let canonical = CanonicalLeaf {
        miner_id: &record.miner_id,
        user_id: &record.user_id,
        reward_date: record.reward_date.format(DATE_FORMAT).to_string(),
        user_btc: record.user_btc.to_string(),
        net_btc: record.net_btc.to_string(),
    };

    serde_json::to_string(&canonical).map_err(|e| Error::invalid_field("record", e.to_string()))
}

/// Leaf digest of a record under SHA256.
pub fn hash_leaf(record: &RewardLeafRecord) -> Result<Digest> {
    hash_leaf_with(&Sha256Hasher, record)
}

/// Leaf digest of a record under a caller-supplied hasher.
pub fn hash_leaf_with<H: MerkleHasher + ?Sized>(hasher: &H, record: &RewardLeafRecord) -> Result<Digest> {
    let encoded = encode_leaf(record)?;
    Ok(hasher.hash(encoded.as_bytes()))
}

/// Leaf digests of a batch, in input order. Fails on the first bad record.
pub fn hash_leaves_with<H: MerkleHasher + ?Sized>(
    hasher: &H,
    records: &[RewardLeafRecord],
) -> Result<Vec<Digest>> {
    records.iter().map(|r| hash_leaf_with(hasher, r)).collect()
}
