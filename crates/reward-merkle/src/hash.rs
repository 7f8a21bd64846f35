//! Digest type and the SHA256 primitive shared by leaves and inner nodes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::error::Error;

/// Size in bytes of every leaf and node digest.
pub const DIGEST_LEN: usize = 32;

/// A 32-byte leaf or node digest.
///
/// Ordering is lexicographic by byte value, which is the order the pair
/// hash uses to decide which operand goes first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex with a `0x` prefix, the form roots are published in.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = Error;

    /// Parse 64 hex characters, optionally prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let bytes = hex::decode(trimmed)
            .map_err(|e| Error::InvalidDigest(format!("{}: {}", s, e)))?;

        let bytes: [u8; DIGEST_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidDigest(format!("expected {} bytes, got {}", DIGEST_LEN, b.len()))
        })?;

        Ok(Digest(bytes))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Hash primitive used for both leaf hashing and pair hashing.
///
/// Implementations must be pure: the same input always yields the same
/// digest, and no state is shared between calls.
pub trait MerkleHasher: Send + Sync {
    /// Hash arbitrary bytes into a fixed-length digest.
    fn hash(&self, data: &[u8]) -> Digest;
}

/// Single SHA256, the production hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl MerkleHasher for Sha256Hasher {
    #[inline]
    fn hash(&self, data: &[u8]) -> Digest {
        Digest(sha256(data))
    }
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LEN] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; DIGEST_LEN];
    result.copy_from_slice(&hash);
    result
}

/// Combine two sibling digests into their parent.
///
/// The operands are sorted before concatenation, so
/// `hash_pair(h, a, b) == hash_pair(h, b, a)` and a verifier never needs
/// to know which side a sibling sat on.
pub fn hash_pair<H: MerkleHasher + ?Sized>(hasher: &H, a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let mut combined = [0u8; 2 * DIGEST_LEN];
    combined[..DIGEST_LEN].copy_from_slice(lo.as_bytes());
    combined[DIGEST_LEN..].copy_from_slice(hi.as_bytes());
    hasher.hash(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            hex::encode(sha256(b"hello")),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_length_is_fixed() {
        let short = Sha256Hasher.hash(b"a");
        let long = Sha256Hasher.hash(&[0xAB; 4096]);
        assert_eq!(short.as_bytes().len(), DIGEST_LEN);
        assert_eq!(long.as_bytes().len(), DIGEST_LEN);
    }

    #[test]
    fn test_hash_pair_is_commutative() {
        let a = Digest::new([0x11; 32]);
        let b = Digest::new([0x22; 32]);
        assert_eq!(hash_pair(&Sha256Hasher, &a, &b), hash_pair(&Sha256Hasher, &b, &a));
    }

    #[test]
    fn test_hash_pair_known_vector() {
        let a = Digest::new([0x11; 32]);
        let b = Digest::new([0x22; 32]);
        assert_eq!(
            hash_pair(&Sha256Hasher, &b, &a).to_hex(),
            "5189c77d29fe5d546a045ec46986852785fea5c13ac7da9c115ff5fb6edf817c"
        );
    }

    #[test]
    fn test_hash_pair_sorts_by_byte_value() {
        let mut low = [0xFF; 32];
        low[0] = 0x00;
        let mut high = [0x00; 32];
        high[0] = 0x01;
        let (low, high) = (Digest::new(low), Digest::new(high));

        let mut expected = [0u8; 64];
        expected[..32].copy_from_slice(low.as_bytes());
        expected[32..].copy_from_slice(high.as_bytes());

        assert_eq!(hash_pair(&Sha256Hasher, &high, &low), Digest::new(sha256(&expected)));
    }

    #[test]
    fn test_digest_parse() {
        let hex = "5189c77d29fe5d546a045ec46986852785fea5c13ac7da9c115ff5fb6edf817c";
        let plain: Digest = hex.parse().unwrap();
        let prefixed: Digest = format!("0x{}", hex).parse().unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.to_string(), hex);
        assert_eq!(plain.to_prefixed_hex(), format!("0x{}", hex));
    }

    #[test]
    fn test_digest_parse_rejects_bad_input() {
        assert!(matches!("0x1234".parse::<Digest>(), Err(Error::InvalidDigest(_))));
        assert!(matches!("zz".repeat(32).parse::<Digest>(), Err(Error::InvalidDigest(_))));
        assert!(matches!("".parse::<Digest>(), Err(Error::InvalidDigest(_))));
    }

    #[test]
    fn test_digest_serde_uses_prefixed_hex() {
        let digest = Digest::new([0xAB; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));

        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
