//! # State Store Adapter
//!
//! In-memory contract storage for testing and local sandboxes. State is
//! kept as bincode bytes, the way a ledger keeps a contract's data cell, so
//! every load goes through a real decode.

use crate::domain::entities::ContactBookState;
use crate::domain::value_objects::Address;
use crate::errors::StorageError;
use crate::ports::outbound::StateStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory state store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    cells: RwLock<HashMap<Address, Vec<u8>>>,
}

impl InMemoryStateStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw bytes stored for `contract`.
    pub fn put_raw(&self, contract: Address, bytes: Vec<u8>) {
        self.cells.write().insert(contract, bytes);
    }

    /// Size in bytes of the stored record, if any.
    #[must_use]
    pub fn stored_size(&self, contract: &Address) -> Option<usize> {
        self.cells.read().get(contract).map(Vec::len)
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, contract: Address) -> Result<Option<ContactBookState>, StorageError> {
        let cells = self.cells.read();
        let Some(bytes) = cells.get(&contract) else {
            return Ok(None);
        };
        bincode::deserialize(bytes)
            .map(Some)
            .map_err(|e| StorageError::Corrupted(e.to_string()))
    }

    async fn commit(
        &self,
        contract: Address,
        state: &ContactBookState,
    ) -> Result<(), StorageError> {
        let bytes =
            bincode::serialize(state).map_err(|e| StorageError::Corrupted(e.to_string()))?;
        self.cells.write().insert(contract, bytes);
        Ok(())
    }

    async fn remove(&self, contract: Address) -> Result<(), StorageError> {
        self.cells.write().remove(&contract);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
