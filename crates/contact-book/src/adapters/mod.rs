//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the ports: an in-memory state store, a
//! sandbox ledger, and the IPC event handler.

pub mod event_handler;
pub mod ledger;
pub mod state_store;

pub use event_handler::*;
pub use ledger::*;
pub use state_store::*;
