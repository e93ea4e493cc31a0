//! Fixed 10-byte command frame exchanged with siren controllers.
//!
//! Layout: `[length marker][BCC][reserved][payload 0..7, zero-padded]`.
//! The BCC is a single-byte XOR accumulator over bytes 3..=9, padding
//! included, so a frame carrying only an opcode checksums to the opcode
//! itself.

use crate::commands::Command;

/// Total frame size on the wire
pub const FRAME_LEN: usize = 10;

/// Maximum payload (opcode + up to 6 argument bytes)
pub const PAYLOAD_MAX: usize = 7;

/// Byte 0 of every frame carries the frame length
pub const LENGTH_MARKER: u8 = FRAME_LEN as u8;

/// XOR checksum over frame bytes 3..=9.
///
/// Accepts a short slice and checksums whatever payload bytes are
/// present, so it can be applied to partially filled buffers.
pub fn bcc(frame: &[u8]) -> u8 {
    frame
        .iter()
        .skip(3)
        .take(PAYLOAD_MAX)
        .fold(0u8, |acc, b| acc ^ b)
}

/// Build a wire frame from a payload (opcode byte + argument bytes).
///
/// A payload longer than [`PAYLOAD_MAX`] is truncated, never rejected;
/// the controllers only read 7 payload bytes.
pub fn build_frame(payload: &[u8]) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];

    let len = payload.len().min(PAYLOAD_MAX);
    frame[3..3 + len].copy_from_slice(&payload[..len]);

    frame[0] = LENGTH_MARKER;
    frame[1] = bcc(&frame);
    // frame[2] reserved, stays zero

    frame
}

/// A verified inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u8,
    pub args: [u8; 6],
}

impl Frame {
    /// Parse and verify an inbound datagram: exact length, marker,
    /// checksum. Byte 0 declares a 10-byte frame, so trailing bytes
    /// are a malformed datagram, not padding.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() != FRAME_LEN {
            return None;
        }
        if data[0] != LENGTH_MARKER {
            return None;
        }
        if data[1] != bcc(data) {
            return None;
        }

        let mut args = [0u8; 6];
        args.copy_from_slice(&data[4..FRAME_LEN]);

        Some(Self {
            opcode: data[3],
            args,
        })
    }

    /// Opcode resolved against the command table, if it is a known one.
    pub fn command(&self) -> Option<Command> {
        Command::from_u8(self.opcode)
    }
}
