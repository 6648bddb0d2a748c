//! # Driven Ports (SPI - Outbound)
//!
//! What the contract needs from its host ledger:
//! - persistent storage of its single state record
//! - balances, atomic settlement of outgoing transfers, and bouncing of
//!   failed messages
//!
//! Adapters implement these traits. The in-memory ones in
//! [`crate::adapters`] stand in for a local sandbox chain.

use crate::domain::entities::{ContactBookState, FeeSchedule, InboundMessage, OutgoingMessage};
use crate::domain::value_objects::{Address, Coins};
use crate::errors::{LedgerError, StorageError};
use async_trait::async_trait;

// =============================================================================
// STATE STORE
// =============================================================================

/// Persistent storage of one contract's state record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the committed state.
    ///
    /// # Returns
    ///
    /// * `Some(state)` - If the contract has been deployed
    /// * `None` - If nothing is stored at `contract`
    async fn load(&self, contract: Address) -> Result<Option<ContactBookState>, StorageError>;

    /// Replace the committed state.
    async fn commit(&self, contract: Address, state: &ContactBookState)
        -> Result<(), StorageError>;

    /// Drop whatever is stored at `contract`. Removing nothing is not an error.
    async fn remove(&self, contract: Address) -> Result<(), StorageError>;

    /// True if a state is stored at `contract`.
    async fn exists(&self, contract: Address) -> Result<bool, StorageError> {
        Ok(self.load(contract).await?.is_some())
    }
}

// =============================================================================
// LEDGER HOST
// =============================================================================

/// Value accounting performed by the host ledger.
///
/// ## Implementation Notes
///
/// `settle` must be all-or-nothing: either the inbound credit, every
/// outgoing transfer and every fee are applied, or none of them are.
#[async_trait]
pub trait LedgerHost: Send + Sync {
    /// Current balance of `account`. Unknown accounts hold zero.
    async fn balance(&self, account: Address) -> Result<Coins, LedgerError>;

    /// Credit `inbound.value` to `contract`, then debit every outgoing value
    /// plus `fees.per_message` each.
    ///
    /// # Returns
    ///
    /// * `Coins` - Total fees charged
    async fn settle(
        &self,
        contract: Address,
        inbound: &InboundMessage,
        outgoing: &[OutgoingMessage],
        fees: &FeeSchedule,
    ) -> Result<Coins, LedgerError>;

    /// Record a failed inbound message. Its value is not credited.
    async fn bounce(
        &self,
        contract: Address,
        inbound: &InboundMessage,
        reason: &str,
    ) -> Result<(), LedgerError>;
}
