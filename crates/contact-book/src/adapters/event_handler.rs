//! # Event Handler Adapter
//!
//! Translates IPC payloads into `ContactBookApi` calls and results back into
//! response payloads. Contract failures become `success: false` responses;
//! the correlation ID is always echoed.

use crate::domain::entities::InboundMessage;
use crate::domain::value_objects::Coins;
use crate::events::{
    DeliverMessageRequestPayload, DeliverMessageResponsePayload, GetAddressStatRequestPayload,
    GetAddressStatResponsePayload,
};
use crate::ports::inbound::ContactBookApi;
use std::sync::Arc;
use tracing::debug;

/// Event handler for contact book requests.
pub struct ContactBookEventHandler<T: ContactBookApi> {
    api: Arc<T>,
}

impl<T: ContactBookApi> ContactBookEventHandler<T> {
    /// Create a new event handler.
    pub fn new(api: Arc<T>) -> Self {
        Self { api }
    }

    /// Handle a `DeliverMessageRequest`.
    pub async fn handle_deliver_message(
        &self,
        payload: DeliverMessageRequestPayload,
    ) -> DeliverMessageResponsePayload {
        let correlation_id = payload.correlation_id;
        debug!(%correlation_id, sender = %payload.sender, "Handling deliver request");

        let message = InboundMessage::new(payload.sender, payload.value, payload.body);
        match self.api.handle_message(message).await {
            Ok(receipt) => DeliverMessageResponsePayload {
                correlation_id,
                success: true,
                kind: Some(receipt.kind),
                outgoing: receipt.outgoing,
                events: receipt.events,
                fees_paid: receipt.fees_paid,
                error: None,
            },
            Err(err) => DeliverMessageResponsePayload {
                correlation_id,
                success: false,
                kind: None,
                outgoing: Vec::new(),
                events: Vec::new(),
                fees_paid: Coins::ZERO,
                error: Some(err.to_string()),
            },
        }
    }

    /// Handle a `GetAddressStatRequest`.
    pub async fn handle_get_address_stat(
        &self,
        payload: GetAddressStatRequestPayload,
    ) -> GetAddressStatResponsePayload {
        let result = self.api.get_address_stat(payload.address).await;
        GetAddressStatResponsePayload {
            correlation_id: payload.correlation_id,
            address: payload.address,
            stat: result.as_ref().ok().copied().flatten(),
            error: result.err().map(|e| e.to_string()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
