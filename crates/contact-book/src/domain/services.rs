//! # Domain Services
//!
//! The contract's state-transition functions. Pure: no I/O, no async.
//!
//! Every handler validates all preconditions before touching the state, so
//! a returned error always leaves `state` exactly as it was.

use crate::domain::entities::{
    ContactBookState, ContractEvent, ExecutionContext, FeeSchedule, InitParams, OutgoingMessage,
    Transition,
};
use crate::domain::messages::ContractMessage;
use crate::domain::value_objects::{Address, Body, Coins};
use crate::errors::ContractError;
use sha2::{Digest, Sha256};

// =============================================================================
// DISPATCH
// =============================================================================

/// Routes a decoded message to its handler.
///
/// # Errors
///
/// Whatever the selected handler returns.
pub fn execute(
    state: &mut ContactBookState,
    ctx: &ExecutionContext,
    message: ContractMessage,
) -> Result<Transition, ContractError> {
    match message {
        ContractMessage::TopUp => Ok(top_up(ctx)),
        ContractMessage::AddContact(m) => add_contact(state, ctx.sender, m.address),
        ContractMessage::RemoveContact(m) => remove_contact(state, ctx.sender, m.address),
        ContractMessage::SendToContact(m) => send_to_contact(state, ctx, m.to, m.body),
        ContractMessage::Broadcast(m) => broadcast(state, ctx, &m.comment, m.value),
        ContractMessage::Plain(body) => receive_default(state, ctx, body),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Fails with `Unauthorized` unless `requester` is the owner.
///
/// # Errors
///
/// `Unauthorized`.
pub fn ensure_owner(state: &ContactBookState, requester: Address) -> Result<(), ContractError> {
    if state.is_owner(&requester) {
        Ok(())
    } else {
        Err(ContractError::Unauthorized {
            sender: requester,
            owner: state.owner(),
        })
    }
}

/// Adds `target` with counter 0. Re-adding an existing contact is a no-op.
///
/// # Errors
///
/// `Unauthorized`, or `CapacityExceeded` if the book is full and `target`
/// is new.
pub fn add_contact(
    state: &mut ContactBookState,
    requester: Address,
    target: Address,
) -> Result<Transition, ContractError> {
    ensure_owner(state, requester)?;

    if state.contains(&target) {
        return Ok(Transition::empty());
    }
    if state.is_full() {
        return Err(ContractError::CapacityExceeded {
            capacity: state.capacity(),
        });
    }

    state.insert_contact(target);
    Ok(Transition::event(ContractEvent::ContactAdded { address: target }))
}

/// Removes `target`. Removing an absent address is a no-op.
///
/// # Errors
///
/// `Unauthorized`.
pub fn remove_contact(
    state: &mut ContactBookState,
    requester: Address,
    target: Address,
) -> Result<Transition, ContractError> {
    ensure_owner(state, requester)?;

    if state.remove_contact(&target) {
        Ok(Transition::event(ContractEvent::ContactRemoved { address: target }))
    } else {
        Ok(Transition::empty())
    }
}

/// Sends `body` with the inbound value to one contact and bumps its counter.
///
/// # Errors
///
/// `Unauthorized`, `UnknownContact`, or `InsufficientBalance` if the
/// balance cannot cover the attached value plus one message fee.
pub fn send_to_contact(
    state: &mut ContactBookState,
    ctx: &ExecutionContext,
    target: Address,
    body: Body,
) -> Result<Transition, ContractError> {
    ensure_owner(state, ctx.sender)?;
    if !state.contains(&target) {
        return Err(ContractError::UnknownContact(target));
    }
    ensure_funded(ctx, 1, ctx.inbound_value)?;

    let counter = state
        .bump(&target)
        .ok_or(ContractError::UnknownContact(target))?;

    Ok(Transition {
        outgoing: vec![OutgoingMessage {
            to: target,
            value: ctx.inbound_value,
            body,
        }],
        events: vec![ContractEvent::SentToContact {
            to: target,
            counter,
        }],
    })
}

/// Sends `comment` and `per_recipient` to every contact, bumping each
/// counter once. All-or-nothing.
///
/// # Errors
///
/// `Unauthorized`, `ValueOverflow`, or `InsufficientBalance` if the balance
/// cannot cover `n × (per_recipient + fee)`.
pub fn broadcast(
    state: &mut ContactBookState,
    ctx: &ExecutionContext,
    comment: &str,
    per_recipient: Coins,
) -> Result<Transition, ContractError> {
    ensure_owner(state, ctx.sender)?;

    let recipients = state.len();
    ensure_funded(ctx, recipients, per_recipient)?;

    let body = Body::comment(comment);
    let outgoing = state
        .contacts()
        .keys()
        .map(|to| OutgoingMessage {
            to: *to,
            value: per_recipient,
            body: body.clone(),
        })
        .collect();
    state.bump_all();

    Ok(Transition {
        outgoing,
        events: vec![ContractEvent::Broadcast { recipients }],
    })
}

/// Default handler for unrecognised bodies.
///
/// Messages from anyone but the owner are relayed verbatim to the owner with
/// the inbound value. The sender's counter is left alone.
///
/// # Errors
///
/// `NoRecipientSpecified` if the owner sent it, or `InsufficientBalance`.
pub fn receive_default(
    state: &ContactBookState,
    ctx: &ExecutionContext,
    body: Body,
) -> Result<Transition, ContractError> {
    if state.is_owner(&ctx.sender) {
        return Err(ContractError::NoRecipientSpecified);
    }
    ensure_funded(ctx, 1, ctx.inbound_value)?;

    Ok(Transition {
        outgoing: vec![OutgoingMessage {
            to: state.owner(),
            value: ctx.inbound_value,
            body,
        }],
        events: vec![ContractEvent::ForwardedToOwner { from: ctx.sender }],
    })
}

/// Empty-body message: the value stays on the contract.
#[must_use]
pub fn top_up(ctx: &ExecutionContext) -> Transition {
    Transition::event(ContractEvent::ToppedUp {
        from: ctx.sender,
        value: ctx.inbound_value,
    })
}

/// Read-only stat query.
#[must_use]
pub fn get_address_stat(state: &ContactBookState, address: &Address) -> Option<u64> {
    state.stat(address)
}

// =============================================================================
// FUNDING
// =============================================================================

/// Total needed to send `count` messages of `value` each, fees included.
///
/// # Errors
///
/// `ValueOverflow`.
pub fn required_funds(
    count: usize,
    value: Coins,
    fees: &FeeSchedule,
) -> Result<Coins, ContractError> {
    let count_u64 = u64::try_from(count).map_err(|_| ContractError::ValueOverflow)?;
    let values = value
        .checked_mul(count_u64)
        .ok_or(ContractError::ValueOverflow)?;
    let fee_total = fees
        .for_messages(count)
        .ok_or(ContractError::ValueOverflow)?;
    values
        .checked_add(fee_total)
        .ok_or(ContractError::ValueOverflow)
}

fn ensure_funded(ctx: &ExecutionContext, count: usize, value: Coins) -> Result<(), ContractError> {
    let required = required_funds(count, value, &ctx.fees)?;
    if required > ctx.balance {
        return Err(ContractError::InsufficientBalance {
            required,
            available: ctx.balance,
        });
    }
    Ok(())
}

// =============================================================================
// ADDRESS DERIVATION
// =============================================================================

/// Derives the contract address from its init parameters.
///
/// `SHA-256(bincode(init))` on the basechain. Identical parameters always
/// give the same address.
///
/// # Errors
///
/// `InvariantViolation` if the parameters cannot be serialized.
pub fn compute_contract_address(init: &InitParams) -> Result<Address, ContractError> {
    let encoded =
        bincode::serialize(init).map_err(|e| ContractError::InvariantViolation(e.to_string()))?;
    let digest = Sha256::digest(&encoded);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    Ok(Address::basechain(hash))
}

// =============================================================================
// TESTS
// =============================================================================
