//! Host lifecycle.
//!
//! ```text
//! stdin/stdout ─► IpcChannel ─► RequestCorrelator ─┐
//!                                                  ├─► MethodDispatcher ─► McpServer
//!                           FirefoxLauncher ───────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::dispatch::{FirefoxLauncher, LaunchOptions, MethodDispatcher};
use crate::error::Result;
use crate::server::McpServer;
use crate::transport::IpcChannel;

use super::builder::HostBuilder;

// ============================================================================
// Host
// ============================================================================

/// Configured native-messaging host.
pub struct Host {
    port: u16,
    bind_ip: IpAddr,
    firefox_binary: PathBuf,
    request_timeout: Duration,
    launch_options: LaunchOptions,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("bind_ip", &self.bind_ip)
            .field("port", &self.port)
            .field("firefox_binary", &self.firefox_binary)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Host - Public API
// ============================================================================

impl Host {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub(crate) fn new(builder: HostBuilder) -> Self {
        Self {
            port: builder.port,
            bind_ip: builder.bind_ip,
            firefox_binary: builder.firefox_binary,
            request_timeout: builder.request_timeout,
            launch_options: builder.launch_options,
        }
    }

    /// Returns the configured WebSocket port.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the extension request timeout.
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Starts the WebSocket server on top of an existing extension channel.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::PortInUse`] if the port is taken
    /// - [`crate::Error::Io`] if binding fails otherwise
    pub async fn serve(&self, channel: &IpcChannel) -> Result<Arc<McpServer>> {
        let launcher = FirefoxLauncher::new(self.firefox_binary.clone(), self.launch_options.clone());
        let dispatcher = MethodDispatcher::new(channel.correlator(), Arc::new(launcher));

        McpServer::bind(self.bind_ip, self.port, dispatcher).await
    }

    /// Runs the host on stdin/stdout until interrupted.
    ///
    /// The server keeps answering after the extension disconnects; every
    /// `browser.openUrl` call then uses the fallback launcher.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::PortInUse`] if the port is taken
    /// - [`crate::Error::Io`] if binding or signal handling fails
    pub async fn run(self) -> Result<()> {
        let channel = IpcChannel::stdio(self.request_timeout);
        let server = self.serve(&channel).await?;

        info!(
            url = %server.ws_url(),
            timeout_ms = self.request_timeout.as_millis() as u64,
            "Host ready"
        );

        tokio::signal::ctrl_c().await?;
        server.shutdown();

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
