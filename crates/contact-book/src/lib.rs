//! # Contact Book - Ledger-Resident Address Book Contract
//!
//! An owner-curated address book that routes value-bearing messages to and
//! from its contacts and counts interactions per contact.
//!
//! ## Purpose
//!
//! The core is the contract's state-transition logic: owner authorization,
//! bounded contact storage, broadcast fan-out under balance constraints,
//! forwarding of foreign messages to the owner, and stat tracking. Every
//! inbound message is atomic: it either commits storage and all outgoing
//! transfers, or changes nothing.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `contacts.len() <= capacity` | `domain/services.rs` - `add_contact()`, `domain/invariants.rs` - `check_capacity_invariant()` |
//! | Only the owner mutates or sends | `domain/services.rs` - `ensure_owner()` |
//! | Counters never decrease | `domain/invariants.rs` - `check_counter_monotonic_invariant()` |
//! | Sends are funded | `domain/services.rs` - `required_funds()`, `domain/invariants.rs` - `check_funding_invariant()` |
//! | No partial commits | `service.rs` - `ContactBookService::apply()` |
//!
//! ## Messages
//!
//! | Message | Authorized Sender | Effect |
//! |---------|-------------------|--------|
//! | `AddContactMessage` | owner | insert with counter 0 |
//! | `RemoveContactMessage` | owner | remove |
//! | `SendToContactMessage` | owner | one message to a contact, counter +1 |
//! | `BroadcastMessage` | owner | one message per contact, every counter +1 |
//! | empty body | anyone | top-up |
//! | anything else | anyone but the owner | forwarded to the owner |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `StateStore` | Load/commit the contract's state record |
//! | `LedgerHost` | Balances, settlement, bounces |
//!
//! ## Usage Example
//!
//! ```ignore
//! use contact_book::prelude::*;
//!
//! let service = create_test_service(InitParams::new(owner, 10)).await?;
//! service.send(owner, Coins::ZERO, &ContractMessage::add_contact(friend)).await?;
//! assert_eq!(service.get_address_stat(friend).await?, Some(0));
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        ContactBookState, ContactMap, ContractEvent, ExecutionContext, FeeSchedule,
        InboundMessage, InitParams, OutgoingMessage, Transition, DEFAULT_MESSAGE_FEE,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Body, Coins, NANO_PER_COIN};

    // Messages
    pub use crate::domain::messages::{
        opcodes, AddContactMessage, BroadcastMessage, ContractMessage, MessageKind,
        RemoveContactMessage, SendToContactMessage,
    };

    // Domain services
    pub use crate::domain::services::{compute_contract_address, required_funds};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{ContactBookApi, TransactionReceipt};
    pub use crate::ports::outbound::{LedgerHost, StateStore};

    // Events
    pub use crate::events::{
        topics, DeliverMessageRequestPayload, DeliverMessageResponsePayload,
        GetAddressStatRequestPayload, GetAddressStatResponsePayload,
    };

    // Errors
    pub use crate::errors::{
        CodecError, ConfigError, ContractError, LedgerError, StorageError,
    };

    // Adapters
    pub use crate::adapters::{
        ContactBookEventHandler, InMemoryLedger, InMemoryStateStore, TransactionRecord, TxFilter,
    };

    // Service
    pub use crate::service::{
        create_test_service, ContactBookService, ServiceConfig, ServiceStats,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
