//! JSON-RPC dispatch.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MethodDispatcher`] | Method table and `tools/call` handling |
//! | [`BrowserLauncher`] | Fallback when the extension is unavailable |
//! | [`FirefoxLauncher`] | Spawns a detached Firefox process |
//! | [`LaunchOptions`] | Fallback process arguments |

// ============================================================================
// Submodules
// ============================================================================

/// Method table and handlers.
pub mod dispatcher;

/// Fallback browser launcher.
pub mod launcher;

/// Tool catalog.
pub mod tools;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::MethodDispatcher;
pub use launcher::{BrowserLauncher, FirefoxLauncher, LaunchOptions};
pub use tools::{OPEN_URL_TOOL, ToolDefinition};
