//! Message types for both protocol channels.
//!
//! # Protocol Overview
//!
//! | Message Type | Channel | Direction | Purpose |
//! |--------------|---------|-----------|---------|
//! | `Request` | IPC | Host → Extension | Browser action request |
//! | `Response` | IPC | Extension → Host | Action result or error |
//! | `RpcRequest` | WebSocket | Client → Host | JSON-RPC 2.0 call |
//! | `RpcResponse` | WebSocket | Host → Client | JSON-RPC 2.0 result or error |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `action` | Browser actions understood by the extension |
//! | `message` | IPC request and response envelopes |
//! | `rpc` | JSON-RPC envelopes and error codes |

// ============================================================================
// Submodules
// ============================================================================

/// Browser actions understood by the extension.
pub mod action;

/// IPC request and response envelopes.
pub mod message;

/// JSON-RPC 2.0 envelopes.
pub mod rpc;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::Action;
pub use message::{Request, Response};
pub use rpc::{RpcError, RpcRequest, RpcResponse};
