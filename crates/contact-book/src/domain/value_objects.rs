//! # Value Objects
//!
//! Immutable domain primitives for the contact book contract.
//! These types represent concepts that are defined by their value, not identity.

use crate::errors::{AddressParseError, CoinsParseError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ADDRESS (workchain + 32-byte account hash)
// =============================================================================

/// Length of the account hash part of an address.
pub const ACCOUNT_HASH_LEN: usize = 32;

/// A fixed-width ledger account address.
///
/// Ordering is by workchain first, then by account hash. The contact map is
/// keyed by this order, which makes broadcast iteration deterministic.
///
/// Human-readable formats (JSON) carry the raw string form so addresses can
/// key JSON objects; binary formats carry `(workchain, hash)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address {
    /// Workchain identifier (0 = basechain, -1 = masterchain).
    pub workchain: i8,
    /// Account hash within the workchain.
    pub hash: [u8; ACCOUNT_HASH_LEN],
}

impl Address {
    /// The zero address on the basechain.
    pub const ZERO: Self = Self {
        workchain: 0,
        hash: [0u8; ACCOUNT_HASH_LEN],
    };

    /// Creates an address from a workchain and a 32-byte hash.
    #[must_use]
    pub const fn new(workchain: i8, hash: [u8; ACCOUNT_HASH_LEN]) -> Self {
        Self { workchain, hash }
    }

    /// Creates a basechain address from a 32-byte hash.
    #[must_use]
    pub const fn basechain(hash: [u8; ACCOUNT_HASH_LEN]) -> Self {
        Self::new(0, hash)
    }

    /// Creates an address from a hash slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(workchain: i8, slice: &[u8]) -> Option<Self> {
        let hash: [u8; ACCOUNT_HASH_LEN] = slice.try_into().ok()?;
        Some(Self::new(workchain, hash))
    }

    /// Canonical byte representation: workchain byte followed by the hash.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ACCOUNT_HASH_LEN + 1] {
        let mut out = [0u8; ACCOUNT_HASH_LEN + 1];
        out[0] = self.workchain.to_be_bytes()[0];
        out[1..].copy_from_slice(&self.hash);
        out
    }

    /// Full raw form, e.g. `0:3f5a...` with all 64 hex digits.
    #[must_use]
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.workchain)?;
        for byte in &self.hash[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.hash[30..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (wc, hash_hex) = s.split_once(':').ok_or(AddressParseError::MissingSeparator)?;
        let workchain = wc
            .parse::<i8>()
            .map_err(|_| AddressParseError::InvalidWorkchain(wc.to_string()))?;
        let bytes = hex::decode(hash_hex).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(workchain, &bytes).ok_or(AddressParseError::InvalidLength(bytes.len()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_raw_string())
        } else {
            (self.workchain, self.hash).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let raw = String::deserialize(deserializer)?;
            raw.parse().map_err(D::Error::custom)
        } else {
            let (workchain, hash) = <(i8, [u8; ACCOUNT_HASH_LEN])>::deserialize(deserializer)?;
            Ok(Self::new(workchain, hash))
        }
    }
}

// =============================================================================
// COINS (nano-denominated amount)
// =============================================================================

/// Nano units per whole coin.
pub const NANO_PER_COIN: u128 = 1_000_000_000;

/// Number of fractional digits in the decimal representation.
const COIN_DECIMALS: usize = 9;

/// A non-negative amount of the ledger's native currency, in nano units.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coins(u128);

impl Coins {
    /// Zero coins.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from nano units.
    #[must_use]
    pub const fn from_nano(nano: u128) -> Self {
        Self(nano)
    }

    /// Creates an amount from whole coins.
    #[must_use]
    pub const fn from_coins(coins: u64) -> Self {
        Self(coins as u128 * NANO_PER_COIN)
    }

    /// Returns the amount in nano units.
    #[must_use]
    pub const fn nano(&self) -> u128 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction. None if `other > self`.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Checked multiplication by a count.
    #[must_use]
    pub fn checked_mul(self, count: u64) -> Option<Self> {
        self.0.checked_mul(u128::from(count)).map(Self)
    }

    /// Saturating subtraction.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Debug for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coins({self})")
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / NANO_PER_COIN;
        let frac = self.0 % NANO_PER_COIN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0width$}", width = COIN_DECIMALS);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Coins {
    type Err = CoinsParseError;

    /// Parses a decimal amount such as `"11"`, `"0.05"` or `"1.000000001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoinsParseError::Empty);
        }
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if frac.len() > COIN_DECIMALS {
            return Err(CoinsParseError::TooPrecise(frac.len()));
        }
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
            return Err(CoinsParseError::InvalidDigits(s.to_string()));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| CoinsParseError::InvalidDigits(s.to_string()))?
        };
        let frac_nano: u128 = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<width$}", width = COIN_DECIMALS)
                .parse()
                .map_err(|_| CoinsParseError::InvalidDigits(s.to_string()))?
        };

        whole
            .checked_mul(NANO_PER_COIN)
            .and_then(|n| n.checked_add(frac_nano))
            .map(Self)
            .ok_or(CoinsParseError::Overflow)
    }
}

// =============================================================================
// BODY (message payload)
// =============================================================================

/// Opcode prefix of a text comment body.
pub const COMMENT_OPCODE: u32 = 0;

/// Opaque message payload.
///
/// A comment body is the 32-bit big-endian opcode `0` followed by UTF-8 text.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Body(pub Vec<u8>);

impl Body {
    /// Creates an empty body.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a body from a vector.
    #[must_use]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Self(vec)
    }

    /// Creates a body from a slice.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }

    /// Creates a text comment body.
    #[must_use]
    pub fn comment(text: &str) -> Self {
        let mut bytes = Vec::with_capacity(4 + text.len());
        bytes.extend_from_slice(&COMMENT_OPCODE.to_be_bytes());
        bytes.extend_from_slice(text.as_bytes());
        Self(bytes)
    }

    /// Leading 32-bit opcode, if the body is long enough to carry one.
    #[must_use]
    pub fn opcode(&self) -> Option<u32> {
        let head: [u8; 4] = self.0.get(..4)?.try_into().ok()?;
        Some(u32::from_be_bytes(head))
    }

    /// Bytes following the opcode (empty if there is no opcode).
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.0.get(4..).unwrap_or_default()
    }

    /// Returns the comment text if this is a valid UTF-8 comment body.
    #[must_use]
    pub fn as_comment(&self) -> Option<&str> {
        if self.opcode()? != COMMENT_OPCODE {
            return None;
        }
        std::str::from_utf8(self.payload()).ok()
    }

    /// Returns a reference to the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.as_comment() {
            return write!(f, "Comment({text:?})");
        }
        write!(f, "0x")?;
        if self.0.len() <= 8 {
            for byte in &self.0 {
                write!(f, "{byte:02x}")?;
            }
        } else {
            for byte in &self.0[..4] {
                write!(f, "{byte:02x}")?;
            }
            write!(f, "..({} bytes)", self.0.len())?;
        }
        Ok(())
    }
}

impl From<Vec<u8>> for Body {
    fn from(vec: Vec<u8>) -> Self {
        Self(vec)
    }
}

impl From<&[u8]> for Body {
    fn from(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }
}

impl AsRef<[u8]> for Body {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
