//! Error types for the Firefox MCP host.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use firefox_mcp_host::{Action, Result};
//!
//! async fn example(correlator: &RequestCorrelator) -> Result<()> {
//!     let result = correlator.send(Action::open_url("https://example.com")).await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::PortInUse`], [`Error::ProcessLaunchFailed`] |
//! | IPC Channel | [`Error::ChannelNotConnected`], [`Error::ChannelLost`], [`Error::RequestTimeout`], [`Error::Extension`] |
//! | WebSocket | [`Error::Handshake`], [`Error::UnmaskedFrame`], [`Error::Protocol`] |
//! | Dispatch | [`Error::MethodNotFound`], [`Error::ToolNotFound`], [`Error::InvalidParams`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::RequestId;
use crate::protocol::rpc::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when host configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// WebSocket port already bound by another process.
    ///
    /// Fatal on startup.
    #[error("Port {port} is already in use")]
    PortInUse {
        /// The port that could not be bound.
        port: u16,
    },

    /// Failed to launch the fallback browser process.
    #[error("Failed to launch browser: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    // ========================================================================
    // IPC Channel Errors
    // ========================================================================
    /// The extension channel is known to be closed.
    ///
    /// Returned immediately by `send` once end-of-input was observed.
    #[error("Extension not connected")]
    ChannelNotConnected,

    /// The extension channel closed while the request was pending.
    #[error("Extension channel lost")]
    ChannelLost,

    /// No response from the extension within the timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The extension answered with an error.
    #[error("Extension error: {message}")]
    Extension {
        /// Error message reported by the extension.
        message: String,
    },

    // ========================================================================
    // WebSocket Errors
    // ========================================================================
    /// HTTP upgrade request was rejected.
    #[error("Handshake failed: {message}")]
    Handshake {
        /// Reason the upgrade was rejected.
        message: String,
    },

    /// Client sent a frame without the mask bit.
    #[error("Client frame is not masked")]
    UnmaskedFrame,

    /// WebSocket protocol violation.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// JSON-RPC request is not a request object.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Why the request was rejected.
        message: String,
    },

    /// Unknown JSON-RPC method.
    #[error("Method not found: {method}")]
    MethodNotFound {
        /// The unrecognized method.
        method: String,
    },

    /// `tools/call` named a tool that is not in the catalog.
    #[error("Tool not found: {name}")]
    ToolNotFound {
        /// The requested tool name.
        name: String,
    },

    /// Invalid JSON-RPC params.
    #[error("Invalid params: {message}")]
    InvalidParams {
        /// Description of the invalid params.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a port in use error.
    #[inline]
    pub fn port_in_use(port: u16) -> Self {
        Self::PortInUse { port }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates an extension error.
    #[inline]
    pub fn extension(message: impl Into<String>) -> Self {
        Self::Extension {
            message: message.into(),
        }
    }

    /// Creates a handshake error.
    #[inline]
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[inline]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a method not found error.
    #[inline]
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Creates a tool not found error.
    #[inline]
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Creates an invalid params error.
    #[inline]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if the extension channel is unavailable.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(self, Self::ChannelNotConnected | Self::ChannelLost)
    }

    /// Returns `true` if a WebSocket peer violated the protocol.
    #[inline]
    #[must_use]
    pub fn is_websocket_error(&self) -> bool {
        matches!(
            self,
            Self::Handshake { .. } | Self::UnmaskedFrame | Self::Protocol { .. }
        )
    }

    /// Returns `true` if this error is reported to JSON-RPC callers as-is.
    #[inline]
    #[must_use]
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::MethodNotFound { .. }
                | Self::ToolNotFound { .. }
                | Self::InvalidParams { .. }
        )
    }

    /// Returns the JSON-RPC error code for this error.
    ///
    /// Unknown tool names share `-32602` with invalid params.
    #[must_use]
    pub fn rpc_code(&self) -> i64 {
        match self {
            Self::Json(_) => PARSE_ERROR,
            Self::InvalidRequest { .. } => INVALID_REQUEST,
            Self::MethodNotFound { .. } => METHOD_NOT_FOUND,
            Self::ToolNotFound { .. } | Self::InvalidParams { .. } => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
