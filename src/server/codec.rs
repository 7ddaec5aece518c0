//! WebSocket frame codec (RFC 6455 subset).
//!
//! Inbound frames are decoded from a [`FrameBuffer`] and reassembled into
//! complete text messages. Outbound messages are always a single unmasked
//! text frame.
//!
//! # Frame Layout
//!
//! ```text
//!  0               1               2               3
//! ┌─┬───┬───────┬─┬─────────────┬───────────────────────────────┐
//! │F│RSV│opcode │M│ len (7)     │ ext len (16 / 64, big-endian) │
//! ├─┴───┴───────┴─┴─────────────┼───────────────────────────────┤
//! │ masking key (4, client only)│ payload ...                   │
//! └─────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! Client frames must be masked; an unmasked frame terminates the connection.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::FrameBuffer;

// ============================================================================
// Constants
// ============================================================================

/// Length field value announcing a 16-bit extended length.
const LEN_16: u8 = 126;

/// Length field value announcing a 64-bit extended length.
const LEN_64: u8 = 127;

/// Largest payload that fits the 7-bit length field.
const MAX_INLINE_LEN: usize = 125;

// ============================================================================
// Opcode
// ============================================================================

/// Frame opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Continuation of a fragmented message.
    Continuation,
    /// UTF-8 text.
    Text,
    /// Binary data.
    Binary,
    /// Connection close.
    Close,
    /// Keep-alive ping.
    Ping,
    /// Keep-alive pong.
    Pong,
    /// Reserved opcode.
    Reserved(u8),
}

impl Opcode {
    /// Parses the low 4 bits of the first header byte.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Self {
        match byte & 0x0F {
            0x0 => Self::Continuation,
            0x1 => Self::Text,
            0x2 => Self::Binary,
            0x8 => Self::Close,
            0x9 => Self::Ping,
            0xA => Self::Pong,
            other => Self::Reserved(other),
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Continuation => 0x0,
            Self::Text => 0x1,
            Self::Binary => 0x2,
            Self::Close => 0x8,
            Self::Ping => 0x9,
            Self::Pong => 0xA,
            Self::Reserved(other) => other,
        }
    }
}

// ============================================================================
// Frame
// ============================================================================

/// A decoded inbound frame (payload already unmasked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Final fragment flag.
    pub fin: bool,
    /// Frame opcode.
    pub opcode: Opcode,
    /// Unmasked payload.
    pub payload: Vec<u8>,
}

/// Parses one frame from the front of `buffer`.
///
/// Returns `Ok(None)` without consuming anything when the frame is not fully
/// buffered yet.
///
/// # Errors
///
/// - [`Error::UnmaskedFrame`] if the mask bit is unset
/// - [`Error::Protocol`] if the payload length does not fit in memory
pub fn parse_frame(buffer: &mut FrameBuffer) -> Result<Option<Frame>> {
    let Some(header) = buffer.peek(0, 2) else {
        return Ok(None);
    };
    let (first, second) = (header[0], header[1]);

    if second & 0x80 == 0 {
        return Err(Error::UnmaskedFrame);
    }

    let fin = first & 0x80 != 0;
    let opcode = Opcode::from_u8(first);
    let mut offset = 2;

    let length = match second & 0x7F {
        LEN_16 => {
            let Some(ext) = buffer.peek(offset, 2) else {
                return Ok(None);
            };
            offset += 2;
            u64::from(u16::from_be_bytes([ext[0], ext[1]]))
        }
        LEN_64 => {
            let Some(ext) = buffer.peek(offset, 8) else {
                return Ok(None);
            };
            offset += 8;
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(ext);
            u64::from_be_bytes(bytes)
        }
        inline => u64::from(inline),
    };
    let length = usize::try_from(length)
        .map_err(|_| Error::protocol(format!("frame length {length} exceeds address space")))?;

    let Some(key) = buffer.peek(offset, 4) else {
        return Ok(None);
    };
    let mask = [key[0], key[1], key[2], key[3]];
    offset += 4;

    let Some(masked) = buffer.peek(offset, length) else {
        return Ok(None);
    };
    let payload = masked
        .iter()
        .enumerate()
        .map(|(i, byte)| byte ^ mask[i % 4])
        .collect();

    buffer.advance(offset + length);
    Ok(Some(Frame {
        fin,
        opcode,
        payload,
    }))
}

// ============================================================================
// Decoded
// ============================================================================

/// Result of decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete text message.
    Text(String),
    /// A frame was consumed without completing a deliverable message.
    Consumed,
    /// The peer closed the connection.
    Close,
}

// ============================================================================
// FrameDecoder
// ============================================================================

/// A message being reassembled from fragments.
#[derive(Debug)]
struct PartialMessage {
    opcode: Opcode,
    payload: Vec<u8>,
}

/// Per-connection inbound decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: FrameBuffer,
    message: Option<PartialMessage>,
}

impl FrameDecoder {
    /// Creates a decoder with an empty buffer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder seeded with bytes left over from the handshake.
    #[inline]
    #[must_use]
    pub fn with_buffer(buffer: FrameBuffer) -> Self {
        Self {
            buffer,
            message: None,
        }
    }

    /// Appends received bytes.
    #[inline]
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend(chunk);
    }

    /// Returns the number of buffered, not yet decoded bytes.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Decodes the next frame.
    ///
    /// Returns `Ok(None)` when no complete frame is buffered. Call in a loop
    /// until it does.
    ///
    /// # Errors
    ///
    /// Any error means the connection must be terminated.
    pub fn decode(&mut self) -> Result<Option<Decoded>> {
        let Some(frame) = parse_frame(&mut self.buffer)? else {
            return Ok(None);
        };
        trace!(fin = frame.fin, opcode = ?frame.opcode, len = frame.payload.len(), "Frame decoded");

        let message = match frame.opcode {
            Opcode::Close => return Ok(Some(Decoded::Close)),
            Opcode::Text | Opcode::Binary => self.message.insert(PartialMessage {
                opcode: frame.opcode,
                payload: frame.payload,
            }),
            Opcode::Continuation => match self.message.as_mut() {
                Some(message) => {
                    message.payload.extend_from_slice(&frame.payload);
                    message
                }
                None => {
                    debug!("Discarding continuation frame without initial frame");
                    return Ok(Some(Decoded::Consumed));
                }
            },
            Opcode::Ping | Opcode::Pong | Opcode::Reserved(_) => {
                return Ok(Some(Decoded::Consumed));
            }
        };

        if !frame.fin {
            return Ok(Some(Decoded::Consumed));
        }

        let is_text = message.opcode == Opcode::Text;
        let complete = self.message.take().map(|m| m.payload).unwrap_or_default();

        if is_text {
            Ok(Some(Decoded::Text(String::from_utf8_lossy(&complete).into_owned())))
        } else {
            Ok(Some(Decoded::Consumed))
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes a text message as one unmasked, final text frame.
#[must_use]
pub fn encode_text(text: &str) -> Vec<u8> {
    let payload = text.as_bytes();
    let len = payload.len();
    let mut frame = Vec::with_capacity(len + 10);

    frame.push(0x80 | Opcode::Text.as_u8());
    if len <= MAX_INLINE_LEN {
        frame.push(len as u8);
    } else if let Ok(len) = u16::try_from(len) {
        frame.push(LEN_16);
        frame.extend_from_slice(&len.to_be_bytes());
    } else {
        frame.push(LEN_64);
        frame.extend_from_slice(&(len as u64).to_be_bytes());
    }
    frame.extend_from_slice(payload);

    frame
}

/// Encodes a masked client frame.
///
/// Only built for tests and the `bench` feature.
#[cfg(any(test, feature = "bench"))]
#[must_use]
pub fn encode_client_frame(fin: bool, opcode: Opcode, payload: &[u8], mask: [u8; 4]) -> Vec<u8> {
    let len = payload.len();
    let mut frame = Vec::with_capacity(len + 14);

    frame.push((if fin { 0x80 } else { 0 }) | opcode.as_u8());
    if len <= MAX_INLINE_LEN {
        frame.push(0x80 | len as u8);
    } else if let Ok(len) = u16::try_from(len) {
        frame.push(0x80 | LEN_16);
        frame.extend_from_slice(&len.to_be_bytes());
    } else {
        frame.push(0x80 | LEN_64);
        frame.extend_from_slice(&(len as u64).to_be_bytes());
    }
    frame.extend_from_slice(&mask);
    frame.extend(payload.iter().enumerate().map(|(i, b)| b ^ mask[i % 4]));

    frame
}

// ============================================================================
// Tests
// ============================================================================
