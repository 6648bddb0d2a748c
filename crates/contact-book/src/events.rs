//! # Event Schema
//!
//! IPC payloads for driving a contact book over a message bus. Every
//! request carries a `correlation_id` that the matching response echoes.
//!
//! | Request | Response |
//! |---------|----------|
//! | `DeliverMessageRequestPayload` | `DeliverMessageResponsePayload` |
//! | `GetAddressStatRequestPayload` | `GetAddressStatResponsePayload` |

use crate::domain::entities::{ContractEvent, OutgoingMessage};
use crate::domain::messages::MessageKind;
use crate::domain::value_objects::{Address, Body, Coins};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bus topics.
pub mod topics {
    /// Inbound message delivery.
    pub const DELIVER_MESSAGE: &str = "contact_book.deliver_message";
    /// Stat queries.
    pub const GET_ADDRESS_STAT: &str = "contact_book.get_address_stat";
    /// Published receipts.
    pub const RECEIPTS: &str = "contact_book.receipts";
}

// =============================================================================
// INBOUND EVENTS
// =============================================================================

/// Deliver one inbound message to the contract.
///
/// The sender identity is part of the payload because the ledger, not the
/// bus envelope, is the authority on who sent a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverMessageRequestPayload {
    /// Correlation ID for request/response matching.
    pub correlation_id: Uuid,
    /// Message sender.
    pub sender: Address,
    /// Attached value.
    pub value: Coins,
    /// Raw body.
    pub body: Body,
}

impl DeliverMessageRequestPayload {
    /// New request with a fresh correlation ID.
    #[must_use]
    pub fn new(sender: Address, value: Coins, body: Body) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            sender,
            value,
            body,
        }
    }
}

/// Result of a delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverMessageResponsePayload {
    /// Echoed correlation ID.
    pub correlation_id: Uuid,
    /// Whether the transition committed.
    pub success: bool,
    /// Decoded message kind, if the transition committed.
    pub kind: Option<MessageKind>,
    /// Outgoing messages.
    pub outgoing: Vec<OutgoingMessage>,
    /// Domain events.
    pub events: Vec<ContractEvent>,
    /// Fees charged.
    pub fees_paid: Coins,
    /// Error text on failure.
    pub error: Option<String>,
}

/// Query the counter of one address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddressStatRequestPayload {
    /// Correlation ID for request/response matching.
    pub correlation_id: Uuid,
    /// Address to look up.
    pub address: Address,
}

impl GetAddressStatRequestPayload {
    /// New request with a fresh correlation ID.
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            address,
        }
    }
}

/// Stat query result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddressStatResponsePayload {
    /// Echoed correlation ID.
    pub correlation_id: Uuid,
    /// Queried address.
    pub address: Address,
    /// Counter, or None if not a contact.
    pub stat: Option<u64>,
    /// Error text if the query could not run.
    pub error: Option<String>,
}
