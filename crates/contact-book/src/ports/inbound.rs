//! # Driving Ports (API - Inbound)
//!
//! The interface exposed by a deployed contact book. Wallets, tests and the
//! IPC event handler all drive the contract through [`ContactBookApi`].

use crate::codec;
use crate::domain::entities::{ContactMap, ContractEvent, InboundMessage, OutgoingMessage};
use crate::domain::messages::{ContractMessage, MessageKind};
use crate::domain::value_objects::{Address, Coins};
use crate::errors::ContractError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// TRANSACTION RECEIPT
// =============================================================================

/// Outcome of one successfully processed inbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// What the body decoded to.
    pub kind: MessageKind,
    /// Messages the ledger delivered.
    pub outgoing: Vec<OutgoingMessage>,
    /// Domain events.
    pub events: Vec<ContractEvent>,
    /// Sum of outgoing values.
    pub value_sent: Coins,
    /// Fees charged by the ledger.
    pub fees_paid: Coins,
}

impl TransactionReceipt {
    /// Number of outgoing messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.outgoing.len()
    }

    /// True if a message was delivered to `to`.
    #[must_use]
    pub fn sent_to(&self, to: &Address) -> bool {
        self.outgoing.iter().any(|m| m.to == *to)
    }
}

// =============================================================================
// CONTACT BOOK API (Primary Driving Port)
// =============================================================================

/// Primary API of a deployed contact book.
///
/// ## Usage
///
/// ```ignore
/// let receipt = api
///     .send(owner, Coins::from_coins(11), &ContractMessage::broadcast("Hello", Coins::from_coins(1)))
///     .await?;
/// ```
#[async_trait]
pub trait ContactBookApi: Send + Sync {
    /// Deliver a raw inbound message.
    ///
    /// The whole message is atomic: on error neither storage nor balances
    /// change and the message is bounced.
    async fn handle_message(
        &self,
        message: InboundMessage,
    ) -> Result<TransactionReceipt, ContractError>;

    /// Counter of `address`, or None if it is not a contact.
    async fn get_address_stat(&self, address: Address) -> Result<Option<u64>, ContractError>;

    /// The owner.
    async fn owner(&self) -> Result<Address, ContractError>;

    /// The capacity bound.
    async fn capacity(&self) -> Result<u32, ContractError>;

    /// Snapshot of every contact and its counter.
    async fn contacts(&self) -> Result<ContactMap, ContractError>;

    /// The contract's current balance.
    async fn balance(&self) -> Result<Coins, ContractError>;

    /// The contract's address.
    fn address(&self) -> Address;

    /// Encode `message` and deliver it from `sender` with `value` attached.
    async fn send(
        &self,
        sender: Address,
        value: Coins,
        message: &ContractMessage,
    ) -> Result<TransactionReceipt, ContractError> {
        let body = codec::encode(message)?;
        self.handle_message(InboundMessage::new(sender, value, body))
            .await
    }
}
