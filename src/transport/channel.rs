//! Extension channel driver.
//!
//! Binds the framer and the correlator to an async byte stream. In
//! production the stream is the host's stdin/stdout, which Firefox connects
//! to the extension's native port.
//!
//! # Tasks
//!
//! ```text
//! reader ──► IpcDecoder ──► RequestCorrelator::on_message
//!                                     │
//! writer ◄── outbound queue ◄── RequestCorrelator::send
//! ```
//!
//! End-of-input, a read error or a write error all end in
//! [`RequestCorrelator::on_channel_closed`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use super::correlator::RequestCorrelator;
use super::framing::IpcDecoder;

// ============================================================================
// Constants
// ============================================================================

/// Read buffer size for the inbound stream.
const READ_CHUNK_SIZE: usize = 8192;

// ============================================================================
// IpcChannel
// ============================================================================

/// Running extension channel.
///
/// Dropping the handle does not stop the tasks; they end with the stream.
pub struct IpcChannel {
    correlator: Arc<RequestCorrelator>,
}

impl IpcChannel {
    /// Spawns the reader and writer tasks for the given stream halves.
    pub fn spawn<R, W>(reader: R, writer: W, request_timeout: Duration) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let correlator = Arc::new(RequestCorrelator::new(outbound_tx, request_timeout));

        tokio::spawn(Self::run_reader(reader, Arc::clone(&correlator)));
        tokio::spawn(Self::run_writer(
            writer,
            outbound_rx,
            Arc::clone(&correlator),
        ));

        Self { correlator }
    }

    /// Spawns the channel on the process's stdin/stdout.
    pub fn stdio(request_timeout: Duration) -> Self {
        Self::spawn(tokio::io::stdin(), tokio::io::stdout(), request_timeout)
    }

    /// Returns the correlator shared by all callers.
    #[inline]
    #[must_use]
    pub fn correlator(&self) -> Arc<RequestCorrelator> {
        Arc::clone(&self.correlator)
    }

    /// Reads chunks until end-of-input and routes decoded messages.
    async fn run_reader<R>(mut reader: R, correlator: Arc<RequestCorrelator>)
    where
        R: AsyncRead + Unpin,
    {
        let mut decoder = IpcDecoder::new();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => {
                    debug!("Extension stream ended");
                    break;
                }
                Ok(n) => {
                    trace!(bytes = n, "IPC chunk received");
                    for message in decoder.feed(&chunk[..n]) {
                        correlator.on_message(message);
                    }
                }
                Err(e) => {
                    error!(error = %e, "Extension stream read failed");
                    break;
                }
            }
        }

        correlator.on_channel_closed();
    }

    /// Writes queued frames in order.
    async fn run_writer<W>(
        mut writer: W,
        mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
        correlator: Arc<RequestCorrelator>,
    ) where
        W: AsyncWrite + Unpin,
    {
        while let Some(frame) = outbound.recv().await {
            let written = async {
                writer.write_all(&frame).await?;
                writer.flush().await
            };

            if let Err(e) = written.await {
                error!(error = %e, "Extension stream write failed");
                correlator.on_channel_closed();
                break;
            }
            trace!(bytes = frame.len(), "IPC frame written");
        }

        debug!("Extension writer terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
