//! Host assembly.
//!
//! Wires the stdin/stdout extension channel, the fallback launcher, the
//! dispatcher and the WebSocket server into one running process.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Host`] | Configured host, ready to run |
//! | [`HostBuilder`] | Fluent configuration builder |
//!
//! # Example
//!
//! ```no_run
//! use firefox_mcp_host::{Host, Result};
//!
//! # async fn example() -> Result<()> {
//! let host = Host::builder()
//!     .port(8080)
//!     .firefox_binary("/usr/bin/firefox")
//!     .build()?;
//!
//! host.run().await
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder for host configuration.
pub mod builder;

/// Host lifecycle.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::HostBuilder;
pub use core::Host;
