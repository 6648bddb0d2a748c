//! # Error Types
//!
//! All error types for the contact book contract.

use crate::domain::value_objects::{Address, Coins};
use thiserror::Error;

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// Errors that abort a contract state transition.
///
/// Every variant is fatal to the current message: storage mutations and
/// queued outgoing messages are discarded together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Sender lacks the owner privilege.
    #[error("unauthorized: sender {sender} is not the owner {owner}")]
    Unauthorized { sender: Address, owner: Address },

    /// The contact dictionary is full.
    #[error("capacity exceeded: contact book holds {capacity} entries")]
    CapacityExceeded { capacity: u32 },

    /// Target address is not in the contact list.
    #[error("unknown contact: {0}")]
    UnknownContact(Address),

    /// Contract balance cannot fund the requested sends and fees.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Coins, available: Coins },

    /// A default message from the owner has no forwarding target.
    #[error("no recipient specified for owner message")]
    NoRecipientSpecified,

    /// Initial dictionary is larger than the capacity bound.
    #[error("initial contact book too large: {size} > capacity {capacity}")]
    InitialBookTooLarge { size: usize, capacity: u32 },

    /// A contract state already exists in the store.
    #[error("contract already deployed at {0}")]
    AlreadyDeployed(Address),

    /// No contract state in the store.
    #[error("contract not deployed")]
    NotDeployed,

    /// A typed opcode carried a payload that does not decode.
    #[error("malformed message for opcode 0x{opcode:08x}")]
    MalformedMessage { opcode: u32 },

    /// Value arithmetic overflowed.
    #[error("value overflow computing required funds")]
    ValueOverflow,

    /// A state invariant does not hold after the transition.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Persistent storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Ledger failure other than the contract's own shortfall, including a
    /// sender that cannot cover the value it attached.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl ContractError {
    /// Returns true if the sender was rejected for lack of privilege.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Short stable label for logs and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::UnknownContact(_) => "unknown_contact",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::NoRecipientSpecified => "no_recipient",
            Self::InitialBookTooLarge { .. } => "initial_book_too_large",
            Self::AlreadyDeployed(_) => "already_deployed",
            Self::NotDeployed => "not_deployed",
            Self::MalformedMessage { .. } => "malformed",
            Self::ValueOverflow => "value_overflow",
            Self::InvariantViolation(_) => "invariant",
            Self::Storage(_) => "storage",
            Self::Ledger(_) => "ledger",
        }
    }
}

// =============================================================================
// STORAGE ERRORS
// =============================================================================

/// Errors from the contract state store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Stored state could not be decoded.
    #[error("state corruption detected: {0}")]
    Corrupted(String),

    /// Store is not reachable.
    #[error("state store unavailable")]
    Unavailable,
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors reported by the host ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The paying account cannot cover the settlement.
    #[error("insufficient funds on {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: Address,
        required: Coins,
        available: Coins,
    },

    /// Balance arithmetic overflowed.
    #[error("balance overflow on {0}")]
    Overflow(Address),

    /// The account is frozen and cannot settle.
    #[error("account {0} is frozen")]
    Frozen(Address),

    /// Ledger is not reachable.
    #[error("ledger unavailable")]
    Unavailable,
}

impl ContractError {
    /// Maps a settlement failure of `contract`.
    ///
    /// Only a shortfall on the contract's own account becomes
    /// `InsufficientBalance`; anything else stays a `Ledger` error.
    #[must_use]
    pub fn from_settlement(contract: Address, err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                account,
                required,
                available,
            } if account == contract => ContractError::InsufficientBalance {
                required,
                available,
            },
            other => ContractError::Ledger(other),
        }
    }
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors encoding or decoding message bodies.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Payload for a typed opcode did not decode.
    #[error("malformed payload for opcode 0x{opcode:08x}: {source}")]
    Malformed {
        opcode: u32,
        #[source]
        source: bincode::Error,
    },

    /// Payload could not be encoded.
    #[error("encoding failed for opcode 0x{opcode:08x}: {source}")]
    Encode {
        opcode: u32,
        #[source]
        source: bincode::Error,
    },
}

impl From<CodecError> for ContractError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Malformed { opcode, .. } | CodecError::Encode { opcode, .. } => {
                ContractError::MalformedMessage { opcode }
            }
        }
    }
}

// =============================================================================
// PARSE ERRORS
// =============================================================================

/// Errors parsing a raw address string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// No `:` between workchain and hash.
    #[error("missing ':' separator")]
    MissingSeparator,

    /// Workchain is not an 8-bit signed integer.
    #[error("invalid workchain: {0}")]
    InvalidWorkchain(String),

    /// Hash part is not hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Hash part has the wrong length.
    #[error("invalid hash length: {0} bytes")]
    InvalidLength(usize),
}

/// Errors parsing a decimal coin amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoinsParseError {
    /// Empty input.
    #[error("empty amount")]
    Empty,

    /// Non-digit characters.
    #[error("invalid amount: {0}")]
    InvalidDigits(String),

    /// More than 9 fractional digits.
    #[error("too many fractional digits: {0}")]
    TooPrecise(usize),

    /// Amount does not fit.
    #[error("amount overflow")]
    Overflow,
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors reading service configuration from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value does not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================
