//! # Message Codec
//!
//! Wire format of inbound bodies: a 32-bit big-endian opcode followed by a
//! bincode-encoded payload for typed messages, or UTF-8 text for comments.
//!
//! | Body | Decoded as |
//! |------|-----------|
//! | empty | `TopUp` |
//! | known typed opcode + payload | the typed message |
//! | anything else | `Plain`, verbatim |

use crate::domain::messages::{opcodes, ContractMessage};
use crate::domain::value_objects::Body;
use crate::errors::CodecError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decodes an inbound body.
///
/// # Errors
///
/// `CodecError::Malformed` if the body carries a typed opcode but the
/// payload does not decode.
pub fn decode(body: &Body) -> Result<ContractMessage, CodecError> {
    if body.is_empty() {
        return Ok(ContractMessage::TopUp);
    }
    let Some(op) = body.opcode() else {
        return Ok(ContractMessage::Plain(body.clone()));
    };

    let payload = body.payload();
    let message = match op {
        opcodes::ADD_CONTACT => ContractMessage::AddContact(payload_of(op, payload)?),
        opcodes::REMOVE_CONTACT => ContractMessage::RemoveContact(payload_of(op, payload)?),
        opcodes::SEND_TO_CONTACT => ContractMessage::SendToContact(payload_of(op, payload)?),
        opcodes::BROADCAST => ContractMessage::Broadcast(payload_of(op, payload)?),
        _ => ContractMessage::Plain(body.clone()),
    };
    Ok(message)
}

/// Encodes a message into its wire body.
///
/// # Errors
///
/// `CodecError::Encode` if the payload cannot be serialized.
pub fn encode(message: &ContractMessage) -> Result<Body, CodecError> {
    match message {
        ContractMessage::TopUp => Ok(Body::new()),
        ContractMessage::Plain(body) => Ok(body.clone()),
        ContractMessage::AddContact(m) => tagged(opcodes::ADD_CONTACT, m),
        ContractMessage::RemoveContact(m) => tagged(opcodes::REMOVE_CONTACT, m),
        ContractMessage::SendToContact(m) => tagged(opcodes::SEND_TO_CONTACT, m),
        ContractMessage::Broadcast(m) => tagged(opcodes::BROADCAST, m),
    }
}

/// Same layout as `bincode::serialize`, but the payload must be consumed
/// exactly.
fn payload_of<T: DeserializeOwned>(opcode: u32, payload: &[u8]) -> Result<T, CodecError> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .deserialize(payload)
        .map_err(|source| CodecError::Malformed { opcode, source })
}

fn tagged<T: Serialize>(opcode: u32, payload: &T) -> Result<Body, CodecError> {
    let encoded =
        bincode::serialize(payload).map_err(|source| CodecError::Encode { opcode, source })?;
    let mut bytes = Vec::with_capacity(4 + encoded.len());
    bytes.extend_from_slice(&opcode.to_be_bytes());
    bytes.extend_from_slice(&encoded);
    Ok(Body::from_vec(bytes))
}
