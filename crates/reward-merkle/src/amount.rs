//! Fixed-point BTC amounts with exactly eight fractional digits.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Satoshis in one BTC.
pub const SATS_PER_BTC: i64 = 100_000_000;

/// Number of fractional digits in every rendered amount.
pub const FRACTION_DIGITS: usize = 8;

/// Reasons an amount cannot be represented.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("amount is not finite: {0}")]
    NonFinite(f64),
    #[error("amount does not fit in a satoshi count")]
    OutOfRange,
    #[error("amount has {0} fractional digits, at most 8 are allowed")]
    TooPrecise(usize),
    #[error("malformed amount: {0:?}")]
    Malformed(String),
}

/// A BTC amount stored as a signed satoshi count.
///
/// Rendering always produces eight fractional digits (`0.10000000`, never
/// `0.1`), so two equal amounts always encode to the same bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BtcAmount(i64);

impl BtcAmount {
    pub const ZERO: BtcAmount = BtcAmount(0);

    pub const fn from_sats(sats: i64) -> Self {
        BtcAmount(sats)
    }

    pub const fn to_sats(self) -> i64 {
        self.0
    }

    /// Convert a floating point BTC value to the nearest satoshi.
    ///
    /// Rounding works on the exact binary value of `btc` with ties away
    /// from zero, the same result JavaScript's `toFixed(8)` produces, so a
    /// number coming from upstream JSON encodes identically on both sides.
    /// NaN and infinities are rejected rather than coerced.
    pub fn from_btc(btc: f64) -> Result<Self, AmountError> {
        if !btc.is_finite() {
            return Err(AmountError::NonFinite(btc));
        }
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if btc.abs() * SATS_PER_BTC as f64 >= i64::MAX as f64 {
            return Err(AmountError::OutOfRange);
        }

        let magnitude =
            i64::try_from(exact_sats(btc.abs())).map_err(|_| AmountError::OutOfRange)?;
        Ok(BtcAmount(if btc.is_sign_negative() { -magnitude } else { magnitude }))
    }

    /// Lossy conversion back to floating point BTC, for display only.
    pub fn to_btc(self) -> f64 {
        self.0 as f64 / SATS_PER_BTC as f64
    }
}

/// `btc * 10^8` rounded half up, computed from the exact value of a
/// finite, non-negative `f64` rather than from a rounded float product.
fn exact_sats(btc: f64) -> u128 {
    let bits = btc.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = u128::from(bits & ((1u64 << 52) - 1));

    // btc == mantissa * 2^exponent
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | 1 << 52, biased - 1075)
    };

    // below 2^80, so the u128 product cannot overflow
    let scaled = mantissa * SATS_PER_BTC as u128;
    if exponent >= 0 {
        return scaled << exponent;
    }

    let shift = (-exponent) as u32;
    if shift >= 128 {
        return 0;
    }
    let whole = scaled >> shift;
    let rest = scaled & ((1u128 << shift) - 1);
    if rest >= 1u128 << (shift - 1) {
        whole + 1
    } else {
        whole
    }
}

impl fmt::Display for BtcAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_btc = SATS_PER_BTC as u64;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / per_btc,
            abs % per_btc,
            width = FRACTION_DIGITS
        )
    }
}

impl FromStr for BtcAmount {
    type Err = AmountError;

    /// Parse a plain decimal such as `0.00012345`, `-1.5` or `42`.
    ///
    /// More than eight fractional digits is an error, never a rounding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AmountError::Malformed(s.to_string());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
            Some(_) => return Err(malformed()),
            None => (body, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if fraction.len() > FRACTION_DIGITS {
            return Err(AmountError::TooPrecise(fraction.len()));
        }

        let whole: u64 = whole.parse().map_err(|_| AmountError::OutOfRange)?;
        let mut frac_sats: u64 = 0;
        for (i, digit) in fraction.bytes().enumerate() {
            frac_sats += u64::from(digit - b'0') * 10u64.pow((FRACTION_DIGITS - 1 - i) as u32);
        }

        let magnitude = whole
            .checked_mul(SATS_PER_BTC as u64)
            .and_then(|sats| sats.checked_add(frac_sats))
            .ok_or(AmountError::OutOfRange)?;
        let magnitude = i64::try_from(magnitude).map_err(|_| AmountError::OutOfRange)?;

        Ok(BtcAmount(if negative { -magnitude } else { magnitude }))
    }
}

impl Serialize for BtcAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BtcAmount {
    /// Accepts the canonical decimal string as well as plain JSON numbers,
    /// which is how upstream reward rows usually carry amounts.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = BtcAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a BTC amount as a decimal string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<BtcAmount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<BtcAmount, E> {
                BtcAmount::from_btc(v).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<BtcAmount, E> {
                v.checked_mul(SATS_PER_BTC)
                    .map(BtcAmount)
                    .ok_or_else(|| E::custom(AmountError::OutOfRange))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<BtcAmount, E> {
                i64::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(SATS_PER_BTC))
                    .map(BtcAmount)
                    .ok_or_else(|| E::custom(AmountError::OutOfRange))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}
