//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the contract and the outside world.
//!
//! - **Driving Ports (Inbound)**: `ContactBookApi`
//! - **Driven Ports (Outbound)**: `StateStore`, `LedgerHost`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
