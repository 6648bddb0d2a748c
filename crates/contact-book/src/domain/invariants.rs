//! # Domain Invariants
//!
//! Properties that must hold after every committed transition. The service
//! checks them between computing a transition and committing it; a
//! violation aborts the message as if the handler had failed.
//!
//! - Capacity: the book never holds more than `capacity` contacts
//! - Ownership: the owner never changes
//! - Monotonic counters: a surviving contact's counter never decreases
//! - Funding: outgoing values plus fees never exceed the balance

use crate::domain::entities::{ContactBookState, ExecutionContext, Transition};
use crate::domain::value_objects::{Address, Coins};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Contacts fit within capacity.
#[must_use]
pub fn check_capacity_invariant(state: &ContactBookState) -> bool {
    state.len() <= state.capacity() as usize
}

/// Owner and capacity are fixed at deploy time.
#[must_use]
pub fn check_owner_invariant(before: &ContactBookState, after: &ContactBookState) -> bool {
    before.owner() == after.owner() && before.capacity() == after.capacity()
}

/// Counters of contacts present both before and after never go down.
#[must_use]
pub fn check_counter_monotonic_invariant(
    before: &ContactBookState,
    after: &ContactBookState,
) -> Option<Address> {
    before
        .contacts()
        .iter()
        .find(|(address, old)| after.stat(address).is_some_and(|new| new < **old))
        .map(|(address, _)| *address)
}

/// The balance covers every outgoing value and its fee.
#[must_use]
pub fn check_funding_invariant(transition: &Transition, ctx: &ExecutionContext) -> Option<Coins> {
    let required = transition
        .total_value()
        .zip(ctx.fees.for_messages(transition.outgoing.len()))
        .and_then(|(values, fees)| values.checked_add(fees));
    match required {
        Some(required) if required <= ctx.balance => None,
        Some(required) => Some(required),
        None => Some(Coins::from_nano(u128::MAX)),
    }
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    before: &ContactBookState,
    after: &ContactBookState,
    transition: &Transition,
    ctx: &ExecutionContext,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_capacity_invariant(after) {
        violations.push(InvariantViolation::CapacityExceeded {
            len: after.len(),
            capacity: after.capacity(),
        });
    }

    if !check_owner_invariant(before, after) {
        violations.push(InvariantViolation::OwnerChanged);
    }

    if let Some(address) = check_counter_monotonic_invariant(before, after) {
        violations.push(InvariantViolation::CounterDecreased { address });
    }

    if let Some(required) = check_funding_invariant(transition, ctx) {
        violations.push(InvariantViolation::Overdrawn {
            required,
            available: ctx.balance,
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Violations joined into one message, or None if valid.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::Valid => None,
            Self::Invalid(violations) => Some(
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More contacts than capacity.
    CapacityExceeded {
        /// Contacts held.
        len: usize,
        /// Bound.
        capacity: u32,
    },
    /// Owner or capacity changed.
    OwnerChanged,
    /// A counter went down.
    CounterDecreased {
        /// Offending contact.
        address: Address,
    },
    /// Outgoing messages cost more than the balance.
    Overdrawn {
        /// Values plus fees.
        required: Coins,
        /// Balance at execution time.
        available: Coins,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded { len, capacity } => {
                write!(f, "contacts exceed capacity: {len} > {capacity}")
            }
            Self::OwnerChanged => write!(f, "owner or capacity changed"),
            Self::CounterDecreased { address } => {
                write!(f, "counter decreased for {address}")
            }
            Self::Overdrawn {
                required,
                available,
            } => write!(f, "overdrawn: required {required} > available {available}"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
