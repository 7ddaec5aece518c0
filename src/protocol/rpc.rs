//! JSON-RPC 2.0 envelopes.
//!
//! Requests arrive as WebSocket text messages; every request produces exactly
//! one response, either `result` or `error`.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// ============================================================================
// Constants
// ============================================================================

/// Protocol version carried by every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request body is not valid JSON.
pub const PARSE_ERROR: i64 = -32700;

/// Request body is JSON but not a request object.
pub const INVALID_REQUEST: i64 = -32600;

/// Method is not in the method table.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Params rejected by the handler (including unknown tool names).
pub const INVALID_PARAMS: i64 = -32602;

/// Unexpected handler failure.
pub const INTERNAL_ERROR: i64 = -32603;

// ============================================================================
// RpcRequest
// ============================================================================

/// A JSON-RPC request.
///
/// `id` is echoed back verbatim; it is `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version (not enforced).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,

    /// Caller-chosen request ID.
    #[serde(default)]
    pub id: Value,

    /// Method name, e.g. `tools/call`.
    pub method: String,

    /// Method params.
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// RpcResponse
// ============================================================================

/// A JSON-RPC response.
///
/// # Format
///
/// ```json
/// { "jsonrpc": "2.0", "id": 1, "result": { ... } }
/// { "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,

    /// Echo of the request ID.
    pub id: Value,

    /// Result (if success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error (if failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Creates a success response.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Creates an error response from a crate error.
    #[must_use]
    pub fn from_error(id: Value, err: &Error) -> Self {
        let message = match err {
            Error::MethodNotFound { .. } => "Method not found".to_string(),
            Error::Json(_) => "Parse error".to_string(),
            other => other.to_string(),
        };
        Self::failure(id, err.rpc_code(), message)
    }

    /// Creates the response for an unparsable request body.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::failure(Value::Null, PARSE_ERROR, "Parse error")
    }

    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// RpcError
// ============================================================================

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================
