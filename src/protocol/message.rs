//! IPC request and response envelopes.
//!
//! Messages exchanged with the extension over the length-prefixed channel.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::Action;

// ============================================================================
// Request
// ============================================================================

/// A request from the host to the extension.
///
/// # Format
///
/// ```json
/// {
///   "id": 0,
///   "action": "openUrl",
///   "params": { "url": "https://example.com" }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Identifier for request/response correlation.
    pub id: RequestId,

    /// Action with its params.
    #[serde(flatten)]
    pub action: Action,
}

impl Request {
    /// Creates a request with the given ID.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, action: Action) -> Self {
        Self { id, action }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A reply from the extension.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 0, "result": { "status": "ok", "url": "https://example.com" } }
/// ```
///
/// Error:
/// ```json
/// { "id": 0, "error": { "message": "Unknown action: foo" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (if error).
    #[serde(default)]
    pub error: Option<Value>,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_null())
    }

    /// Extracts the result value, returning error if the extension failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extension`] carrying the reported message.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) if !error.is_null() => Err(Error::extension(error_message(&error))),
            _ => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Extracts a readable message from an error payload.
fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = Request::new(RequestId::new(3), Action::open_url("https://example.com"));
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(
            value,
            json!({"id": 3, "action": "openUrl", "params": {"url": "https://example.com"}})
        );
    }

    #[test]
    fn test_success_response() {
        let response: Response =
            serde_json::from_str(r#"{"id": 1, "result": {"status": "ok"}}"#).expect("parse");

        assert!(!response.is_error());
        assert_eq!(response.id, RequestId::new(1));
        assert_eq!(response.into_result().expect("ok"), json!({"status": "ok"}));
    }

    #[test]
    fn test_error_response() {
        let response: Response =
            serde_json::from_str(r#"{"id": 2, "error": {"message": "Unknown action: foo"}}"#)
                .expect("parse");

        assert!(response.is_error());
        let err = response.into_result().expect_err("should fail");
        assert_eq!(err.to_string(), "Extension error: Unknown action: foo");
    }

    #[test]
    fn test_error_without_message() {
        let response: Response =
            serde_json::from_str(r#"{"id": 2, "error": "denied"}"#).expect("parse");
        let err = response.into_result().expect_err("should fail");
        assert!(matches!(err, Error::Extension { message } if message == "denied"));
    }

    #[test]
    fn test_missing_result_is_null() {
        let response: Response = serde_json::from_str(r#"{"id": 5}"#).expect("parse");
        assert_eq!(response.into_result().expect("ok"), Value::Null);
    }

    #[test]
    fn test_missing_id_rejected() {
        assert!(serde_json::from_str::<Response>(r#"{"result": 1}"#).is_err());
    }
}
