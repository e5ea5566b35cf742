//! The i3-ipc frame header.
//!
//! Every message in either direction is a 14-byte header followed by a
//! payload: the magic `i3-ipc`, the payload length and the message type, both
//! little-endian `u32`.

use crate::{Error, Result};

/// Leading bytes of every frame.
pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// Size of the fixed header.
pub const HEADER_LEN: usize = 14;

/// Message types we send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MsgType {
    /// Payload is command text.
    RunCommand = 0,
    /// Empty payload; the reply is the layout tree as JSON.
    GetTree = 4,
}

impl MsgType {
    /// Numeric type code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Build a frame: header plus payload.
pub fn encode(kind: MsgType, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&kind.code().to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Parse a reply header into `(payload length, type code)`.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(u32, u32)> {
    let mut magic = [0u8; 6];
    magic.copy_from_slice(&header[..6]);
    if &magic != MAGIC {
        return Err(Error::BadMagic(magic));
    }
    let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let kind = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);
    Ok((len, kind))
}
