//! Builder pattern for host configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use firefox_mcp_host::Host;
//!
//! # fn example() -> firefox_mcp_host::Result<()> {
//! let host = Host::builder()
//!     .port(9000)
//!     .request_timeout(Duration::from_secs(2))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::dispatch::LaunchOptions;
use crate::error::{Error, Result};
use crate::server::{DEFAULT_BIND_IP, DEFAULT_PORT};
use crate::transport::DEFAULT_REQUEST_TIMEOUT;

use super::core::Host;

// ============================================================================
// Constants
// ============================================================================

/// Browser binary used when none is configured.
pub const DEFAULT_FIREFOX_BINARY: &str = "firefox";

// ============================================================================
// HostBuilder
// ============================================================================

/// Builder for configuring a [`Host`] instance.
///
/// Use [`Host::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct HostBuilder {
    /// WebSocket port.
    pub(crate) port: u16,
    /// WebSocket bind address.
    pub(crate) bind_ip: IpAddr,
    /// Fallback browser binary.
    pub(crate) firefox_binary: PathBuf,
    /// Time to wait for the extension.
    pub(crate) request_timeout: Duration,
    /// Fallback browser arguments.
    pub(crate) launch_options: LaunchOptions,
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_ip: DEFAULT_BIND_IP,
            firefox_binary: PathBuf::from(DEFAULT_FIREFOX_BINARY),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            launch_options: LaunchOptions::default(),
        }
    }
}

// ============================================================================
// HostBuilder Implementation
// ============================================================================

impl HostBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the WebSocket port (0 for random).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the WebSocket bind address.
    #[inline]
    #[must_use]
    pub fn bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = ip;
        self
    }

    /// Sets the browser binary used for fallback launches.
    ///
    /// # Arguments
    ///
    /// * `path` - Executable name or path (e.g., "/usr/bin/firefox")
    #[inline]
    #[must_use]
    pub fn firefox_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.firefox_binary = path.into();
        self
    }

    /// Sets how long to wait for an extension reply.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the fallback launch options.
    #[inline]
    #[must_use]
    pub fn launch_options(mut self, options: LaunchOptions) -> Self {
        self.launch_options = options;
        self
    }

    /// Builds the host with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the request timeout is zero
    /// - [`Error::Config`] if the browser binary is empty
    pub fn build(self) -> Result<Host> {
        self.validate()?;
        Ok(Host::new(self))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl HostBuilder {
    fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::config("Request timeout must be greater than zero"));
        }

        if self.firefox_binary.as_os_str().is_empty() {
            return Err(Error::config(
                "Firefox binary is empty. Use .firefox_binary() to set it.\n\
                 Example: Host::builder().firefox_binary(\"/usr/bin/firefox\")",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
