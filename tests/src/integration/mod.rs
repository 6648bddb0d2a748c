//! # Integration Tests
//!
//! - `contact_book_flows`: deploy, contact management, broadcast, direct sends,
//!   forwarding and rollback on the sandbox ledger
//! - `ipc_flows`: the same contract driven through IPC payloads

pub mod contact_book_flows;
pub mod ipc_flows;
