//! Length-prefixed JSON framing for the extension channel.
//!
//! Each unit on the wire is a 4-byte little-endian unsigned length followed
//! by that many bytes of UTF-8 JSON:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ len: u32 LE  │ body: [u8; len] (UTF-8 JSON) │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! [`IpcDecoder`] is a pure state machine: it owns no I/O and can be fed
//! arbitrary chunk boundaries.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{Error, Result};

use super::buffer::FrameBuffer;

// ============================================================================
// Constants
// ============================================================================

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

// ============================================================================
// DecodeState
// ============================================================================

/// Position of the decoder within the current unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Waiting for the 4-byte length prefix.
    ReadingLength,
    /// Waiting for a body of the given length.
    ReadingBody(usize),
}

// ============================================================================
// IpcDecoder
// ============================================================================

/// Incremental decoder for the length-prefixed stream.
#[derive(Debug, Clone)]
pub struct IpcDecoder {
    state: DecodeState,
    buffer: FrameBuffer,
}

impl Default for IpcDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl IpcDecoder {
    /// Creates a decoder waiting for a length prefix.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecodeState::ReadingLength,
            buffer: FrameBuffer::new(),
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> DecodeState {
        self.state
    }

    /// Returns the number of buffered, not yet decoded bytes.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds a chunk and returns every message it completes, in order.
    ///
    /// Bodies that are not valid UTF-8 JSON are dropped; decoding resumes at
    /// the next length prefix.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        self.buffer.extend(chunk);
        let mut messages = Vec::new();

        loop {
            match self.state {
                DecodeState::ReadingLength => {
                    let Some(header) = self.buffer.take(HEADER_LEN) else {
                        break;
                    };
                    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
                    self.state = DecodeState::ReadingBody(length as usize);
                }
                DecodeState::ReadingBody(length) => {
                    let Some(body) = self.buffer.take(length) else {
                        break;
                    };
                    match serde_json::from_slice::<Value>(body) {
                        Ok(value) => {
                            trace!(length, "IPC message decoded");
                            messages.push(value);
                        }
                        Err(e) => warn!(length, error = %e, "Dropping malformed IPC message"),
                    }
                    self.state = DecodeState::ReadingLength;
                }
            }
        }

        messages
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Serializes a message and prefixes it with its byte length.
///
/// Header and body are returned as one buffer so they go out in a single
/// write.
///
/// # Errors
///
/// - [`Error::Json`] if serialization fails
/// - [`Error::Protocol`] if the body exceeds `u32::MAX` bytes
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(message)?;
    let length = u32::try_from(body.len())
        .map_err(|_| Error::protocol(format!("IPC message too large: {} bytes", body.len())))?;

    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

// ============================================================================
// Tests
// ============================================================================
