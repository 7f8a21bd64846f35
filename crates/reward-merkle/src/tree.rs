//! Merkle tree construction and proof path derivation.
//!
//! Layers are built bottom-up with plain loops. Each pair of neighbours is
//! combined with the commutative [`hash_pair`]; a lone node at the end of an
//! odd-length layer is promoted to the next layer unchanged (it is neither
//! duplicated nor hashed with itself).

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::{hash_pair, Digest, MerkleHasher, Sha256Hasher};
use crate::leaf::{hash_leaves_with, RewardLeafRecord};
use crate::proof::MerkleProof;

/// All layers of a built tree, leaves first.
///
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `layers[0]` holds the leaf digests; the last layer holds the root,
    /// or nothing for an empty tree.
    layers: Vec<Vec<Digest>>,
}

/// Serializable export of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub root: Option<Digest>,
    pub leaves: Vec<Digest>,
    pub layers: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree over ordered leaf digests with SHA256.
    pub fn build(leaves: impl Into<Vec<Digest>>) -> Self {
        Self::build_with(&Sha256Hasher, leaves)
    }

    /// Build a tree over ordered leaf digests with the given hasher.
    pub fn build_with<H: MerkleHasher + ?Sized>(hasher: &H, leaves: impl Into<Vec<Digest>>) -> Self {
        let mut current: Vec<Digest> = leaves.into();
        let leaf_count = current.len();
        let mut layers = Vec::new();

        while current.len() > 1 {
            let mut next = Vec::with_capacity((current.len() + 1) / 2);

            for pair in current.chunks(2) {
                let parent = match *pair {
                    [left, right] => hash_pair(hasher, &left, &right),
                    [lone] => lone,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                };
                next.push(parent);
            }

            layers.push(current);
            current = next;
        }
        layers.push(current);

        let tree = MerkleTree { layers };
        debug!(
            leaves = leaf_count,
            layers = tree.layers.len(),
            root = %tree.hex_root(),
            "built merkle tree"
        );
        tree
    }

    /// Hash reward records into leaves (in order) and build over them.
    pub fn from_records(records: &[RewardLeafRecord]) -> Result<Self> {
        Self::from_records_with(&Sha256Hasher, records)
    }

    /// Hash reward records into leaves (in order) and build over them with
    /// the given hasher.
    pub fn from_records_with<H: MerkleHasher + ?Sized>(
        hasher: &H,
        records: &[RewardLeafRecord],
    ) -> Result<Self> {
        let leaves = hash_leaves_with(hasher, records)?;
        Ok(Self::build_with(hasher, leaves))
    }

    /// The root digest, or `None` when the tree has no leaves.
    pub fn root(&self) -> Option<Digest> {
        self.layers.last().and_then(|layer| layer.first()).copied()
    }

    /// Root as `0x`-prefixed hex, or bare `0x` for an empty tree.
    pub fn hex_root(&self) -> String {
        match self.root() {
            Some(root) => root.to_prefixed_hex(),
            None => "0x".to_string(),
        }
    }

    pub fn leaves(&self) -> &[Digest] {
        &self.layers[0]
    }

    pub fn layers(&self) -> &[Vec<Digest>] {
        &self.layers
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of layers above the leaves.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Sibling digests needed to climb from leaf `index` to the root,
    /// bottom to top.
    ///
    /// Layers where the node was promoted without a sibling contribute
    /// nothing, so the path can be shorter than [`depth`](Self::depth).
    pub fn prove(&self, index: usize) -> Result<Vec<Digest>> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut pos = index;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = if pos % 2 == 1 { pos - 1 } else { pos + 1 };
            if let Some(node) = layer.get(sibling) {
                siblings.push(*node);
            }
            pos /= 2;
        }

        trace!(index, siblings = siblings.len(), "derived merkle path");
        Ok(siblings)
    }

    /// Full self-contained proof bundle for leaf `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        let proof = self.prove(index)?;
        let root = self
            .root()
            .ok_or(Error::IndexOutOfRange { index, len: 0 })?;

        Ok(MerkleProof {
            leaf: self.layers[0][index],
            proof,
            root,
            index,
        })
    }

    /// Proof for the first leaf equal to `leaf`, if any.
    pub fn proof_for_leaf(&self, leaf: &Digest) -> Option<MerkleProof> {
        let index = self.leaves().iter().position(|l| l == leaf)?;
        self.proof(index).ok()
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: self.root(),
            leaves: self.leaves().to_vec(),
            layers: self.layers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    /// SHA256 that counts invocations.
    #[derive(Default)]
    struct CountingHasher {
        calls: AtomicUsize,
    }

    impl MerkleHasher for CountingHasher {
        fn hash(&self, data: &[u8]) -> Digest {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Sha256Hasher.hash(data)
        }
    }

    fn d(byte: u8) -> Digest {
        Digest::new([byte; 32])
    }

    fn ph(a: Digest, b: Digest) -> Digest {
        hash_pair(&Sha256Hasher, &a, &b)
    }

    #[test]
    fn test_empty_tree() {
        let tree = MerkleTree::build(Vec::<Digest>::new());
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.hex_root(), "0x");
        assert_eq!(tree.layers().len(), 1);
        assert!(tree.layers()[0].is_empty());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.prove(0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
        assert!(tree.proof(0).is_err());
    }

    #[test]
    fn test_single_leaf_is_root_without_hashing() {
        let hasher = CountingHasher::default();
        let tree = MerkleTree::build_with(&hasher, vec![d(0x42)]);

        assert_eq!(tree.root(), Some(d(0x42)));
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
        assert!(tree.prove(0).unwrap().is_empty());
    }

    #[test]
    fn test_two_leaves() {
        let tree = MerkleTree::build(vec![d(0x11), d(0x22)]);
        assert_eq!(tree.root(), Some(ph(d(0x11), d(0x22))));
        assert_eq!(tree.prove(0).unwrap(), vec![d(0x22)]);
        assert_eq!(tree.prove(1).unwrap(), vec![d(0x11)]);
    }

    #[test]
    fn test_three_leaves_promote_lone_node() {
        let (a, b, c) = (d(0x11), d(0x22), d(0x33));
        let hasher = CountingHasher::default();
        let tree = MerkleTree::build_with(&hasher, vec![a, b, c]);

        assert_eq!(tree.layers()[1], vec![ph(a, b), c]);
        assert_eq!(tree.root(), Some(ph(ph(a, b), c)));
        assert_eq!(
            tree.hex_root(),
            "0x277b6f43115f5bfd44a875c69575ec332ca5cae7eb76566270a122038611e48f"
        );
        // one hash per real pair, none for the promoted node
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 2);

        assert_eq!(tree.prove(2).unwrap(), vec![ph(a, b)]);
        assert_eq!(tree.prove(0).unwrap(), vec![b, c]);
    }

    #[test]
    fn test_four_leaf_scenario() {
        let leaves = vec![d(0xA0), d(0xB0), d(0xC0), d(0xD0)];
        let tree = MerkleTree::build(leaves.clone());

        let left = ph(leaves[0], leaves[1]);
        let right = ph(leaves[2], leaves[3]);
        assert_eq!(tree.layers()[1], vec![left, right]);
        assert_eq!(tree.root(), Some(ph(left, right)));
        assert_eq!(tree.prove(2).unwrap(), vec![leaves[3], left]);
    }

    #[test]
    fn test_layer_sizes_round_up() {
        let leaves: Vec<Digest> = (0..5u8).map(d).collect();
        let tree = MerkleTree::build(leaves);
        let sizes: Vec<usize> = tree.layers().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 3, 2, 1]);
        assert_eq!(tree.depth(), 3);

        // leaf 4 is promoted at layer 0 and layer 1
        assert_eq!(tree.prove(4).unwrap().len(), 1);
    }

    #[test]
    fn test_prove_out_of_range() {
        let tree = MerkleTree::build(vec![d(1), d(2), d(3)]);
        assert_eq!(tree.prove(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_build_is_deterministic() {
        let leaves: Vec<Digest> = (0..17u8).map(d).collect();
        assert_eq!(MerkleTree::build(leaves.clone()).root(), MerkleTree::build(leaves).root());
    }

    #[test]
    fn test_order_is_committed() {
        let (a, b, c, dd) = (d(1), d(2), d(3), d(4));
        let in_order = MerkleTree::build(vec![a, b, c, dd]).root();
        let shuffled = MerkleTree::build(vec![a, c, b, dd]).root();
        assert_ne!(in_order, shuffled);
    }

    #[test]
    fn test_reversed_four_leaves_share_root() {
        // Reversal only swaps operands inside each pair hash, which the
        // sorted pairing ignores.
        let (a, b, c, dd) = (d(1), d(2), d(3), d(4));
        assert_eq!(
            MerkleTree::build(vec![a, b, c, dd]).root(),
            MerkleTree::build(vec![dd, c, b, a]).root()
        );
    }

    #[test]
    fn test_proof_bundle() {
        let tree = MerkleTree::build(vec![d(1), d(2), d(3)]);
        let bundle = tree.proof(1).unwrap();
        assert_eq!(bundle.leaf, d(2));
        assert_eq!(bundle.index, 1);
        assert_eq!(Some(bundle.root), tree.root());
        assert_eq!(bundle.proof, tree.prove(1).unwrap());
    }

    #[test]
    fn test_proof_for_leaf() {
        let tree = MerkleTree::build(vec![d(1), d(2), d(3), d(2)]);
        assert_eq!(tree.proof_for_leaf(&d(2)).map(|p| p.index), Some(1));
        assert!(tree.proof_for_leaf(&d(9)).is_none());
    }

    #[test]
    fn test_snapshot() {
        let tree = MerkleTree::build(vec![d(1), d(2), d(3)]);
        let snapshot = tree.snapshot();
        assert_eq!(snapshot.root, tree.root());
        assert_eq!(snapshot.leaves, vec![d(1), d(2), d(3)]);
        assert_eq!(snapshot.layers.len(), 3);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["root"], serde_json::Value::String(tree.hex_root()));

        let empty = MerkleTree::build(Vec::<Digest>::new()).snapshot();
        assert_eq!(serde_json::to_value(&empty).unwrap()["root"], serde_json::Value::Null);
    }
}
