//! Merkle commitments for daily mining reward distributions.
//!
//! This crate provides pure Rust implementations of:
//! - Canonical encoding and SHA256 hashing of reward records into leaves
//! - Binary Merkle tree construction with sorted pair hashing and
//!   odd-node promotion
//! - Inclusion proof generation and verification
//! - Batch lookup of proofs by (miner, reward date)
//!
//! Everything here is synchronous and side-effect free apart from `tracing`
//! events. Trees are immutable once built, so independent batches can be
//! built and queried from any number of threads.

pub mod amount;
pub mod batch;
pub mod error;
pub mod hash;
pub mod leaf;
pub mod proof;
pub mod tree;

pub use amount::{AmountError, BtcAmount};
pub use batch::{find_proof, find_proof_with, BatchOptions, DistributionBatch, LeafOrder};
pub use error::{Error, Result};
pub use hash::{hash_pair, Digest, MerkleHasher, Sha256Hasher};
pub use leaf::{encode_leaf, hash_leaf, hash_leaf_with, RewardKey, RewardLeafRecord};
pub use proof::{verify, verify_record, verify_record_with, verify_with, MerkleProof};
pub use tree::{MerkleTree, TreeSnapshot};
