//! WebSocket server for MCP clients.
//!
//! Minimal RFC 6455 server: HTTP upgrade, masked client frames in, unmasked
//! text frames out. No extensions, no subprotocols, no TLS.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `handshake` | Upgrade request parsing and `Sec-WebSocket-Accept` |
//! | `codec` | Frame decoder with fragment reassembly, text frame encoder |
//! | `pipeline` | Per-connection read, dispatch and write loop |
//! | `listener` | TCP bind and accept loop |

// ============================================================================
// Submodules
// ============================================================================

/// Frame codec.
pub mod codec;

/// Opening handshake.
pub mod handshake;

/// TCP listener.
pub mod listener;

/// Per-connection pipeline.
pub mod pipeline;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{Decoded, Frame, FrameDecoder, Opcode};
pub use listener::{DEFAULT_BIND_IP, DEFAULT_PORT, McpServer};
pub use pipeline::ConnectionPipeline;
