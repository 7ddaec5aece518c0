//! Fallback browser launcher.
//!
//! When the extension cannot be reached, the URL is opened by spawning the
//! browser directly. The process is detached and never awaited.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// LaunchOptions
// ============================================================================

/// Command-line options for the fallback browser process.
///
/// # Example
///
/// ```ignore
/// let options = LaunchOptions::new().with_extra_arg("--no-remote");
/// let args = options.to_args("https://example.com");
/// // ["--no-remote", "-private-window", "https://example.com"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Open the URL in a private window.
    pub private: bool,

    /// Start a separate browser instance.
    pub new_instance: bool,

    /// Additional arguments placed before the URL.
    pub extra_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchOptions {
    /// Creates options for a private window.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            private: true,
            new_instance: false,
            extra_args: Vec::new(),
        }
    }

    /// Sets private browsing mode.
    #[inline]
    #[must_use]
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Requests a separate browser instance.
    #[inline]
    #[must_use]
    pub fn with_new_instance(mut self) -> Self {
        self.new_instance = true;
        self
    }

    /// Adds a custom argument.
    #[inline]
    #[must_use]
    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Builds the argument list for opening `url`.
    #[must_use]
    pub fn to_args(&self, url: &str) -> Vec<String> {
        let mut args = self.extra_args.clone();

        if self.new_instance {
            args.push("--new-instance".to_string());
        }

        args.push(if self.private { "-private-window" } else { "-new-window" }.to_string());
        args.push(url.to_string());

        args
    }
}

// ============================================================================
// BrowserLauncher
// ============================================================================

/// Opens a URL without the extension.
pub trait BrowserLauncher: Send + Sync {
    /// Starts the browser on `url` and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessLaunchFailed`] if the process cannot start.
    fn launch(&self, url: &str) -> Result<()>;
}

// ============================================================================
// FirefoxLauncher
// ============================================================================

/// Spawns a Firefox binary.
#[derive(Clone)]
pub struct FirefoxLauncher {
    /// Path or name of the Firefox executable.
    binary: PathBuf,
    /// Launch options.
    options: LaunchOptions,
}

impl fmt::Debug for FirefoxLauncher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirefoxLauncher")
            .field("binary", &self.binary)
            .field("private", &self.options.private)
            .finish_non_exhaustive()
    }
}

impl FirefoxLauncher {
    /// Creates a launcher for the given binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, options: LaunchOptions) -> Self {
        Self {
            binary: binary.into(),
            options,
        }
    }
}

impl BrowserLauncher for FirefoxLauncher {
    fn launch(&self, url: &str) -> Result<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.options.to_args(url));

        // stdout carries the extension channel; nothing may leak into it.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(Error::process_launch_failed)?;
        debug!(pid = ?child.id(), binary = %self.binary.display(), "Browser process spawned");

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
