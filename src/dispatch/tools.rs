//! Tool catalog.
//!
//! The host exposes a single tool, `browser.openUrl`.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Name of the URL-opening tool.
pub const OPEN_URL_TOOL: &str = "browser.openUrl";

// ============================================================================
// ToolDefinition
// ============================================================================

/// A `tools/list` catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// Tool name used in `tools/call`.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema of the `arguments` object.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Returns the `browser.openUrl` definition.
#[must_use]
pub fn open_url_definition() -> ToolDefinition {
    ToolDefinition {
        name: OPEN_URL_TOOL,
        description: "Opens a URL in a private Firefox window.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to open."
                }
            },
            "required": ["url"]
        }),
    }
}

/// Returns the `tools/list` result.
#[must_use]
pub fn list() -> Value {
    json!({ "tools": [open_url_definition()] })
}

// ============================================================================
// ToolCall
// ============================================================================

/// `tools/call` params.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    /// Requested tool.
    pub name: String,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    /// Parses `tools/call` params.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if `name` is missing.
    pub fn from_params(params: Value) -> Result<Self> {
        serde_json::from_value(params).map_err(|e| Error::invalid_params(e.to_string()))
    }

    /// Extracts and validates the `url` argument of `browser.openUrl`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] unless `url` is an absolute URL.
    pub fn url_argument(&self) -> Result<String> {
        let url = self
            .arguments
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_params("arguments.url must be a string"))?;

        Url::parse(url).map_err(|e| Error::invalid_params(format!("invalid url {url:?}: {e}")))?;
        Ok(url.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_shape() {
        let value = list();
        let tool = &value["tools"][0];

        assert_eq!(value["tools"].as_array().map(Vec::len), Some(1));
        assert_eq!(tool["name"], "browser.openUrl");
        assert_eq!(tool["inputSchema"]["properties"]["url"]["type"], "string");
        assert_eq!(tool["inputSchema"]["required"], json!(["url"]));
    }

    #[test]
    fn test_url_argument() {
        let call = ToolCall::from_params(json!({
            "name": OPEN_URL_TOOL,
            "arguments": {"url": "https://example.com"}
        }))
        .expect("parse");

        assert_eq!(call.url_argument().expect("valid"), "https://example.com");
    }

    #[test]
    fn test_url_argument_missing() {
        let call = ToolCall::from_params(json!({"name": OPEN_URL_TOOL})).expect("parse");
        assert!(matches!(call.url_argument(), Err(Error::InvalidParams { .. })));
    }

    #[test]
    fn test_url_argument_rejects_option_like_values() {
        let call = ToolCall::from_params(json!({
            "name": OPEN_URL_TOOL,
            "arguments": {"url": "--headless"}
        }))
        .expect("parse");

        assert!(call.url_argument().is_err());
    }

    #[test]
    fn test_missing_name() {
        assert!(matches!(
            ToolCall::from_params(json!({"arguments": {}})),
            Err(Error::InvalidParams { .. })
        ));
    }
}
