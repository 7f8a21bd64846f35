//! Inclusion proof bundles and their verification.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::hash::{hash_pair, Digest, MerkleHasher, Sha256Hasher};
use crate::leaf::{hash_leaf_with, RewardLeafRecord};

/// Everything needed to check one leaf against a published root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Leaf digest being proven.
    pub leaf: Digest,
    /// Sibling digests, bottom to top.
    pub proof: Vec<Digest>,
    /// Root the proof was generated against.
    pub root: Digest,
    /// Position of the leaf in the batch.
    pub index: usize,
}

impl MerkleProof {
    pub fn verify(&self) -> bool {
        self.verify_with(&Sha256Hasher)
    }

    pub fn verify_with<H: MerkleHasher + ?Sized>(&self, hasher: &H) -> bool {
        verify_with(hasher, &self.leaf, &self.proof, &self.root, self.index)
    }

    /// Check that `record` (not just the stored leaf digest) is committed
    /// under this proof's root.
    pub fn verify_record(&self, record: &RewardLeafRecord) -> Result<bool> {
        verify_record(record, &self.proof, &self.root, self.index)
    }
}

/// Replay `proof` from `leaf` and compare with `root` under SHA256.
pub fn verify(leaf: &Digest, proof: &[Digest], root: &Digest, index: usize) -> bool {
    verify_with(&Sha256Hasher, leaf, proof, root, index)
}

/// Replay `proof` from `leaf` and compare with `root`.
///
/// Pairing is commutative, so only the sibling values and their order
/// matter; `index` identifies the claim but does not steer the replay.
/// A forged or stale proof yields `false`, never an error.
pub fn verify_with<H: MerkleHasher + ?Sized>(
    hasher: &H,
    leaf: &Digest,
    proof: &[Digest],
    root: &Digest,
    index: usize,
) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |acc, sibling| hash_pair(hasher, &acc, sibling));

    let valid = computed == *root;
    trace!(index, siblings = proof.len(), valid, "verified merkle proof");
    valid
}

/// Hash `record` and verify the resulting leaf under SHA256.
///
/// Errors only when the record itself cannot be encoded.
pub fn verify_record(
    record: &RewardLeafRecord,
    proof: &[Digest],
    root: &Digest,
    index: usize,
) -> Result<bool> {
    verify_record_with(&Sha256Hasher, record, proof, root, index)
}

/// Hash `record` and verify the resulting leaf with the given hasher.
pub fn verify_record_with<H: MerkleHasher + ?Sized>(
    hasher: &H,
    record: &RewardLeafRecord,
    proof: &[Digest],
    root: &Digest,
    index: usize,
) -> Result<bool> {
    let leaf = hash_leaf_with(hasher, record)?;
    Ok(verify_with(hasher, &leaf, proof, root, index))
}
