//! Firefox MCP host - native-messaging bridge between MCP clients and Firefox.
//!
//! The host is launched by Firefox as a native-messaging application. It
//! talks to the companion extension over stdin/stdout and exposes a
//! WebSocket JSON-RPC endpoint for MCP clients on `127.0.0.1:8080`.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  WebSocket   ┌──────────────────────┐  [u32 LE][JSON]  ┌─────────────┐
//! │ MCP client │◄────────────►│ Host                 │◄────────────────►│ Extension   │
//! └────────────┘  JSON-RPC    │  McpServer           │  stdin / stdout  │ (Firefox)   │
//!                             │  MethodDispatcher    │                  └─────────────┘
//!                             │  RequestCorrelator   │
//!                             │  FirefoxLauncher ────┼──► firefox -private-window <url>
//!                             └──────────────────────┘
//! ```
//!
//! When the extension does not answer in time, is gone, or reports an
//! error, `browser.openUrl` falls back to spawning Firefox directly.
//!
//! # Quick Start
//!
//! ```no_run
//! use firefox_mcp_host::{Host, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     Host::builder().port(8080).build()?.run().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`dispatch`] | JSON-RPC methods, tool catalog, fallback launcher |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host assembly and configuration |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Extension and JSON-RPC message types |
//! | [`server`] | WebSocket server |
//! | [`transport`] | Extension channel over stdin/stdout |

// ============================================================================
// Modules
// ============================================================================

/// JSON-RPC method dispatch.
pub mod dispatch;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host assembly.
pub mod host;

/// Type-safe identifiers.
pub mod identifiers;

/// Message types for both sides of the bridge.
pub mod protocol;

/// WebSocket server.
pub mod server;

/// Extension transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Dispatch types
pub use dispatch::{BrowserLauncher, FirefoxLauncher, LaunchOptions, MethodDispatcher};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{Host, HostBuilder};

// Identifier types
pub use identifiers::{ConnectionId, RequestId};

// Server types
pub use server::McpServer;

// Transport types
pub use transport::{IpcChannel, RequestCorrelator};
