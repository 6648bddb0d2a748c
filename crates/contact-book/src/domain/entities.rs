//! # Core Domain Entities
//!
//! Main business entities of the contact book contract: the persistent
//! state record, the messages flowing in and out, and the per-message
//! execution context supplied by the host ledger.

use crate::domain::value_objects::{Address, Body, Coins};
use crate::errors::ContractError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Address → interaction counter.
pub type ContactMap = BTreeMap<Address, u64>;

// =============================================================================
// CONTRACT STATE
// =============================================================================

/// Persistent state of one deployed contact book.
///
/// ## Invariants
/// - `contacts.len() <= capacity`
/// - `owner` never changes after construction
/// - a counter exists iff its address is a contact
///
/// Decoding goes through [`ContactBookState::new`], so a stored record that
/// breaks the capacity bound fails to load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredState")]
pub struct ContactBookState {
    owner: Address,
    contacts: ContactMap,
    capacity: u32,
}

/// Wire shape of [`ContactBookState`] before validation.
#[derive(Deserialize)]
struct StoredState {
    owner: Address,
    contacts: ContactMap,
    capacity: u32,
}

impl TryFrom<StoredState> for ContactBookState {
    type Error = ContractError;

    fn try_from(stored: StoredState) -> Result<Self, Self::Error> {
        Self::new(stored.owner, stored.contacts, stored.capacity)
    }
}

impl ContactBookState {
    /// Builds the initial state.
    ///
    /// # Errors
    ///
    /// `InitialBookTooLarge` if `contacts` holds more entries than `capacity`.
    pub fn new(owner: Address, contacts: ContactMap, capacity: u32) -> Result<Self, ContractError> {
        if contacts.len() > capacity as usize {
            return Err(ContractError::InitialBookTooLarge {
                size: contacts.len(),
                capacity,
            });
        }
        Ok(Self {
            owner,
            contacts,
            capacity,
        })
    }

    /// Builds the initial state from deploy parameters.
    ///
    /// # Errors
    ///
    /// See [`ContactBookState::new`].
    pub fn from_init(init: &InitParams) -> Result<Self, ContractError> {
        Self::new(init.owner, init.contacts.clone(), init.capacity)
    }

    /// The owner address.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Maximum number of contacts.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Current number of contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True if there are no contacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// True if no new contact can be added.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.contacts.len() >= self.capacity as usize
    }

    /// True if `address` is a contact.
    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.contacts.contains_key(address)
    }

    /// Interaction counter of `address`, or None if it is not a contact.
    #[must_use]
    pub fn stat(&self, address: &Address) -> Option<u64> {
        self.contacts.get(address).copied()
    }

    /// Read-only view of the contact map.
    #[must_use]
    pub fn contacts(&self) -> &ContactMap {
        &self.contacts
    }

    /// True if `address` is the owner.
    #[must_use]
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owner == *address
    }

    /// Inserts a contact with counter 0. Returns false if it already existed.
    pub(crate) fn insert_contact(&mut self, address: Address) -> bool {
        if self.contacts.contains_key(&address) {
            return false;
        }
        self.contacts.insert(address, 0);
        true
    }

    /// Removes a contact. Returns false if it was absent.
    pub(crate) fn remove_contact(&mut self, address: &Address) -> bool {
        self.contacts.remove(address).is_some()
    }

    /// Increments a contact's counter, returning the new value.
    pub(crate) fn bump(&mut self, address: &Address) -> Option<u64> {
        let counter = self.contacts.get_mut(address)?;
        *counter = counter.saturating_add(1);
        Some(*counter)
    }

    /// Increments every counter by one.
    pub(crate) fn bump_all(&mut self) {
        for counter in self.contacts.values_mut() {
            *counter = counter.saturating_add(1);
        }
    }
}

// =============================================================================
// INIT PARAMS
// =============================================================================

/// Deploy-time parameters. The contract address is derived from these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    /// Owner address.
    pub owner: Address,
    /// Pre-populated contacts.
    pub contacts: ContactMap,
    /// Capacity bound.
    pub capacity: u32,
}

impl InitParams {
    /// Init params with an empty book.
    #[must_use]
    pub fn new(owner: Address, capacity: u32) -> Self {
        Self {
            owner,
            contacts: ContactMap::new(),
            capacity,
        }
    }

    /// Init params with every address in `list` as a fresh contact.
    #[must_use]
    pub fn with_contacts<I>(owner: Address, list: I, capacity: u32) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        Self {
            owner,
            contacts: list.into_iter().map(|a| (a, 0)).collect(),
            capacity,
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// A message delivered to the contract by the host ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender identity, supplied by the runtime.
    pub sender: Address,
    /// Value attached to the message.
    pub value: Coins,
    /// Raw body.
    pub body: Body,
}

impl InboundMessage {
    /// Creates an inbound message.
    #[must_use]
    pub fn new(sender: Address, value: Coins, body: Body) -> Self {
        Self {
            sender,
            value,
            body,
        }
    }
}

/// A value transfer emitted by the contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Recipient.
    pub to: Address,
    /// Value carried.
    pub value: Coins,
    /// Payload.
    pub body: Body,
}

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// Default fee charged per outgoing message (0.01 coin).
pub const DEFAULT_MESSAGE_FEE: Coins = Coins::from_nano(10_000_000);

/// Runtime fee parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee charged to the contract for each outgoing message.
    pub per_message: Coins,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            per_message: DEFAULT_MESSAGE_FEE,
        }
    }
}

impl FeeSchedule {
    /// A schedule with no fees.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            per_message: Coins::ZERO,
        }
    }

    /// Fees for `count` outgoing messages.
    #[must_use]
    pub fn for_messages(&self, count: usize) -> Option<Coins> {
        self.per_message.checked_mul(u64::try_from(count).ok()?)
    }
}

/// What the runtime tells the contract about the message being processed.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// The contract's own address.
    pub contract: Address,
    /// Sender of the inbound message.
    pub sender: Address,
    /// Value attached to the inbound message.
    pub inbound_value: Coins,
    /// Contract balance, inbound value already credited.
    pub balance: Coins,
    /// Fee parameters.
    pub fees: FeeSchedule,
}

// =============================================================================
// TRANSITION
// =============================================================================

/// Domain event describing what a transition did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    /// A new contact was inserted.
    ContactAdded {
        /// The new contact.
        address: Address,
    },
    /// A contact was removed.
    ContactRemoved {
        /// The removed contact.
        address: Address,
    },
    /// The owner sent a message to one contact.
    SentToContact {
        /// Recipient.
        to: Address,
        /// Recipient's counter after the send.
        counter: u64,
    },
    /// The owner broadcast to every contact.
    Broadcast {
        /// Number of messages emitted.
        recipients: usize,
    },
    /// A non-owner message was relayed to the owner.
    ForwardedToOwner {
        /// Original sender.
        from: Address,
    },
    /// Value was added without any other effect.
    ToppedUp {
        /// Sender.
        from: Address,
        /// Value kept by the contract.
        value: Coins,
    },
}

/// Effects of one successful state transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// Messages to hand to the ledger.
    pub outgoing: Vec<OutgoingMessage>,
    /// What happened.
    pub events: Vec<ContractEvent>,
}

impl Transition {
    /// A transition with no effects.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A transition with a single event and no messages.
    #[must_use]
    pub fn event(event: ContractEvent) -> Self {
        Self {
            outgoing: Vec::new(),
            events: vec![event],
        }
    }

    /// Sum of values carried by outgoing messages.
    #[must_use]
    pub fn total_value(&self) -> Option<Coins> {
        self.outgoing
            .iter()
            .try_fold(Coins::ZERO, |acc, m| acc.checked_add(m.value))
    }
}

// =============================================================================
// TESTS
// =============================================================================
