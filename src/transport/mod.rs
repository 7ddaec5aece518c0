//! Extension transport layer.
//!
//! This module handles communication between the host (Rust) and the
//! browser extension over the native-messaging byte stream.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Host (Rust)    │                              │  Extension      │
//! │                 │   [u32 LE len][JSON body]    │  (Background)   │
//! │  IpcChannel     │◄────────────────────────────►│                 │
//! │  → Correlator   │        stdin / stdout        │  Native Port    │
//! │                 │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `buffer` | Cursor-based byte accumulator |
//! | `framing` | Length-prefixed JSON decoder and encoder |
//! | `correlator` | Request IDs, pending table, timeouts |
//! | `channel` | Reader/writer tasks over an async stream |

// ============================================================================
// Submodules
// ============================================================================

/// Cursor-based byte accumulator.
pub mod buffer;

/// Extension channel driver.
pub mod channel;

/// Request/response correlation.
pub mod correlator;

/// Length-prefixed JSON framing.
pub mod framing;

// ============================================================================
// Re-exports
// ============================================================================

pub use buffer::FrameBuffer;
pub use channel::IpcChannel;
pub use correlator::{DEFAULT_REQUEST_TIMEOUT, Outcome, RequestCorrelator};
pub use framing::IpcDecoder;
