//! # Contract Messages
//!
//! Typed messages the contract recognises, and the opcodes that tag them
//! on the wire.

use crate::domain::value_objects::{Address, Body, Coins};
use serde::{Deserialize, Serialize};

/// 32-bit opcodes prefixed to typed message bodies.
pub mod opcodes {
    /// Plain text comment.
    pub const COMMENT: u32 = 0x0000_0000;
    /// `AddContactMessage`.
    pub const ADD_CONTACT: u32 = 0x6a1f_0c01;
    /// `RemoveContactMessage`.
    pub const REMOVE_CONTACT: u32 = 0x6a1f_0c02;
    /// `SendToContactMessage`.
    pub const SEND_TO_CONTACT: u32 = 0x6a1f_0c03;
    /// `BroadcastMessage`.
    pub const BROADCAST: u32 = 0x6a1f_0c04;

    /// True if `op` tags one of the typed messages.
    #[must_use]
    pub fn is_typed(op: u32) -> bool {
        matches!(op, ADD_CONTACT | REMOVE_CONTACT | SEND_TO_CONTACT | BROADCAST)
    }
}

/// Add an address to the book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddContactMessage {
    /// Address to add.
    pub address: Address,
}

/// Remove an address from the book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveContactMessage {
    /// Address to remove.
    pub address: Address,
}

/// Send a body to one contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendToContactMessage {
    /// Recipient; must be a contact.
    pub to: Address,
    /// Body delivered to the recipient.
    pub body: Body,
}

/// Send the same comment and value to every contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Comment text.
    pub comment: String,
    /// Value sent to each recipient.
    pub value: Coins,
}

/// A decoded inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractMessage {
    /// Empty body: value only.
    TopUp,
    /// Owner adds a contact.
    AddContact(AddContactMessage),
    /// Owner removes a contact.
    RemoveContact(RemoveContactMessage),
    /// Owner sends to one contact.
    SendToContact(SendToContactMessage),
    /// Owner sends to all contacts.
    Broadcast(BroadcastMessage),
    /// Anything else, kept verbatim.
    Plain(Body),
}

impl ContractMessage {
    /// The message kind.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::TopUp => MessageKind::TopUp,
            Self::AddContact(_) => MessageKind::AddContact,
            Self::RemoveContact(_) => MessageKind::RemoveContact,
            Self::SendToContact(_) => MessageKind::SendToContact,
            Self::Broadcast(_) => MessageKind::Broadcast,
            Self::Plain(_) => MessageKind::Plain,
        }
    }

    /// Shorthand for an `AddContact` message.
    #[must_use]
    pub fn add_contact(address: Address) -> Self {
        Self::AddContact(AddContactMessage { address })
    }

    /// Shorthand for a `RemoveContact` message.
    #[must_use]
    pub fn remove_contact(address: Address) -> Self {
        Self::RemoveContact(RemoveContactMessage { address })
    }

    /// Shorthand for a `SendToContact` message.
    #[must_use]
    pub fn send_to_contact(to: Address, body: Body) -> Self {
        Self::SendToContact(SendToContactMessage { to, body })
    }

    /// Shorthand for a `Broadcast` message.
    #[must_use]
    pub fn broadcast(comment: impl Into<String>, value: Coins) -> Self {
        Self::Broadcast(BroadcastMessage {
            comment: comment.into(),
            value,
        })
    }

    /// Shorthand for a plain comment.
    #[must_use]
    pub fn comment(text: &str) -> Self {
        Self::Plain(Body::comment(text))
    }
}

/// Message kind, used as a log field and metric label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Empty body.
    TopUp,
    /// `AddContactMessage`.
    AddContact,
    /// `RemoveContactMessage`.
    RemoveContact,
    /// `SendToContactMessage`.
    SendToContact,
    /// `BroadcastMessage`.
    Broadcast,
    /// Default handler.
    Plain,
}

impl MessageKind {
    /// Stable snake_case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TopUp => "top_up",
            Self::AddContact => "add_contact",
            Self::RemoveContact => "remove_contact",
            Self::SendToContact => "send_to_contact",
            Self::Broadcast => "broadcast",
            Self::Plain => "plain",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
