//! Error types for leaf encoding and proof generation.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Structural failures. Business outcomes (an empty batch, a missing
/// record, a proof that does not verify) are ordinary return values and
/// never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A reward record is malformed and cannot be encoded.
    #[error("invalid leaf record: {field} {reason}")]
    InvalidLeafRecord {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A proof was requested for a position outside the leaf set.
    #[error("leaf index {index} out of range for {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },

    /// Text that does not decode to a 32-byte digest.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

impl Error {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidLeafRecord {
            field,
            reason: reason.into(),
        }
    }
}
