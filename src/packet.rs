//! Framing and checksum codec for the reader's wire protocol.
//!
//! Wire layout: `[id: 1][length: 1][payload: length bytes][checksum: 1]`,
//! where the checksum is the XOR of every preceding byte.

use crate::types::PacketId;

/// Total wire length of an ACK/ATR-style response that carries no semantic
/// payload beyond its id.
pub(crate) const RESPONSE_ATR: usize = 5;

/// Header and checksum bytes wrapped around any payload-carrying response.
pub(crate) const TRANSMIT_OVERHEAD: usize = 3;

/// A decoded frame. Constructed per transaction, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Packet {
    pub id: u8,
    pub payload: Vec<u8>,
}

impl Packet {
    /// The typed identifier, if the id byte maps to a known one.
    pub fn packet_id(&self) -> Option<PacketId> {
        PacketId::try_from(self.id).ok()
    }
}

/// Checksum or length mismatch in a received frame. Always recoverable by
/// the transceiver's retry machinery; never surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CorruptedPacket;

fn checksum(id: u8, length: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(id ^ length, |acc, &byte| acc ^ byte)
}

/// Frame a command for transmission.
pub(crate) fn encode(id: PacketId, payload: &[u8]) -> Vec<u8> {
    let id = id as u8;
    let length = payload.len() as u8;

    let mut frame = Vec::with_capacity(payload.len() + TRANSMIT_OVERHEAD);
    frame.push(id);
    frame.push(length);
    frame.extend_from_slice(payload);
    frame.push(checksum(id, length, payload));
    frame
}

/// Parse and verify a received frame.
pub(crate) fn decode(raw: &[u8]) -> Result<Packet, CorruptedPacket> {
    // Shortest possible frame is a header plus checksum.
    if raw.len() < TRANSMIT_OVERHEAD {
        return Err(CorruptedPacket);
    }

    let (id, length) = (raw[0], raw[1]);
    let payload = &raw[2..raw.len() - 1];
    let received_checksum = raw[raw.len() - 1];

    if payload.len() != length as usize {
        return Err(CorruptedPacket);
    }
    if checksum(id, length, payload) != received_checksum {
        return Err(CorruptedPacket);
    }

    Ok(Packet {
        id,
        payload: payload.to_vec(),
    })
}
