//! Distribution batches: commit a day's reward records once, then answer
//! proof lookups by business key.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::hash::{Digest, MerkleHasher, Sha256Hasher};
use crate::leaf::{hash_leaf_with, RewardKey, RewardLeafRecord};
use crate::proof::MerkleProof;
use crate::tree::MerkleTree;

/// How records are ordered before they become leaves.
///
/// Order is part of the commitment. `AsGiven` trusts the upstream list
/// order; `ByKey` sorts so that anyone holding the same records derives
/// the same root regardless of how they were fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafOrder {
    #[default]
    AsGiven,
    /// Stable sort by `(miner_id, reward_date, user_id)`.
    ByKey,
}

impl LeafOrder {
    pub fn name(&self) -> &'static str {
        match self {
            LeafOrder::AsGiven => "as_given",
            LeafOrder::ByKey => "by_key",
        }
    }

    fn apply(&self, records: &mut [RewardLeafRecord]) {
        if let LeafOrder::ByKey = self {
            records.sort_by(|a, b| {
                (a.miner_id.as_str(), a.reward_date, a.user_id.as_str())
                    .cmp(&(b.miner_id.as_str(), b.reward_date, b.user_id.as_str()))
            });
        }
    }
}

/// Options for committing a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    pub order: LeafOrder,
}

impl BatchOptions {
    pub fn with_order(mut self, order: LeafOrder) -> Self {
        self.order = order;
        self
    }
}

/// A committed set of reward records and the tree over their leaves.
#[derive(Debug, Clone)]
pub struct DistributionBatch {
    records: Vec<RewardLeafRecord>,
    tree: MerkleTree,
}

impl DistributionBatch {
    /// Order, hash and commit `records` with SHA256.
    pub fn commit(records: Vec<RewardLeafRecord>, options: &BatchOptions) -> Result<Self> {
        Self::commit_with(&Sha256Hasher, records, options)
    }

    /// Order, hash and commit `records` with the given hasher.
    ///
    /// Fails on the first record that cannot be encoded; nothing is built.
    pub fn commit_with<H: MerkleHasher + ?Sized>(
        hasher: &H,
        mut records: Vec<RewardLeafRecord>,
        options: &BatchOptions,
    ) -> Result<Self> {
        options.order.apply(&mut records);

        let leaves = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                hash_leaf_with(hasher, record).map_err(|e| {
                    warn!(index = i, miner_id = %record.miner_id, error = %e, "rejected reward record");
                    e
                })
            })
            .collect::<Result<Vec<Digest>>>()?;

        let tree = MerkleTree::build_with(hasher, leaves);
        debug!(
            records = records.len(),
            order = options.order.name(),
            root = %tree.hex_root(),
            "committed distribution batch"
        );

        Ok(DistributionBatch { records, tree })
    }

    /// Root to publish, or `None` if nobody earned anything.
    pub fn root(&self) -> Option<Digest> {
        self.tree.root()
    }

    pub fn hex_root(&self) -> String {
        self.tree.hex_root()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Records in committed (leaf) order.
    pub fn records(&self) -> &[RewardLeafRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Leaf position of the first record with this key.
    pub fn position(&self, key: &RewardKey) -> Option<usize> {
        self.records.iter().position(|r| key.matches(r))
    }

    pub fn proof_at(&self, index: usize) -> Result<MerkleProof> {
        self.tree.proof(index)
    }

    /// Proof bundle for the record with this key, or `None` if the batch
    /// has no such record.
    pub fn proof_for(&self, key: &RewardKey) -> Option<MerkleProof> {
        let index = self.position(key)?;
        self.tree.proof(index).ok()
    }
}

/// Find `target` in `leaves` by business key and prove its inclusion.
///
/// Every record is validated first, so a malformed batch is an error even
/// when the key is absent. Returns `Ok(None)` when no record matches.
/// Leaves are used in the order given.
pub fn find_proof(leaves: &[RewardLeafRecord], target: &RewardKey) -> Result<Option<MerkleProof>> {
    find_proof_with(&Sha256Hasher, leaves, target, &BatchOptions::default())
}

/// [`find_proof`] with an explicit hasher and leaf order.
pub fn find_proof_with<H: MerkleHasher + ?Sized>(
    hasher: &H,
    leaves: &[RewardLeafRecord],
    target: &RewardKey,
    options: &BatchOptions,
) -> Result<Option<MerkleProof>> {
    leaves.iter().try_for_each(RewardLeafRecord::validate)?;
    if !leaves.iter().any(|r| target.matches(r)) {
        return Ok(None);
    }

    let batch = DistributionBatch::commit_with(hasher, leaves.to_vec(), options)?;
    Ok(batch.proof_for(target))
}
