//! Browser actions understood by the extension.
//!
//! Actions are serialized as `action` + `params`, matching the
//! `{id, action, params}` shape the extension's message listener expects.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Action
// ============================================================================

/// An action forwarded to the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params")]
pub enum Action {
    /// Open a URL in a private window.
    ///
    /// The extension reuses an existing private window when one is open.
    #[serde(rename = "openUrl")]
    OpenUrl {
        /// URL to open.
        url: String,
    },
}

impl Action {
    /// Creates an `openUrl` action.
    #[inline]
    #[must_use]
    pub fn open_url(url: impl Into<String>) -> Self {
        Self::OpenUrl { url: url.into() }
    }
}

// ============================================================================
// Tests
// ============================================================================
