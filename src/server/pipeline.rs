//! Per-connection WebSocket pipeline.
//!
//! After the handshake, inbound bytes are decoded into text messages, each
//! message is dispatched on its own task, and responses are written as they
//! complete. Responses may therefore be written in a different order than
//! the requests arrived.
//!
//! ```text
//! socket ─► FrameDecoder ─► spawn(dispatch) ─► encode_text ─► writer task ─► socket
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::dispatch::MethodDispatcher;
use crate::error::Result;
use crate::identifiers::ConnectionId;
use crate::protocol::RpcResponse;

use super::codec::{self, Decoded, FrameDecoder};
use super::handshake;

// ============================================================================
// Constants
// ============================================================================

/// Read buffer size for client sockets.
const READ_CHUNK_SIZE: usize = 8192;

// ============================================================================
// ConnectionPipeline
// ============================================================================

/// Serves one accepted connection.
pub struct ConnectionPipeline {
    id: ConnectionId,
    dispatcher: MethodDispatcher,
}

impl ConnectionPipeline {
    /// Creates a pipeline for the given connection.
    #[must_use]
    pub fn new(id: ConnectionId, dispatcher: MethodDispatcher) -> Self {
        Self { id, dispatcher }
    }

    /// Performs the handshake and serves frames until the connection ends.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Handshake`] if the upgrade is rejected
    /// - [`crate::Error::UnmaskedFrame`] if the client sends an unmasked frame
    /// - [`crate::Error::Io`] on socket failure
    pub async fn serve<S>(self, mut stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let leftover = handshake::accept(&mut stream).await?;
        debug!(connection = %self.id, "WebSocket connection open");

        let (mut reader, mut writer) = tokio::io::split(stream);
        let (frames_tx, mut frames_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        let id = self.id;
        let writer_task = tokio::spawn(async move {
            while let Some(frame) = frames_rx.recv().await {
                let written = async {
                    writer.write_all(&frame).await?;
                    writer.flush().await
                };
                if let Err(e) = written.await {
                    warn!(connection = %id, error = %e, "Socket write failed");
                    break;
                }
                trace!(connection = %id, bytes = frame.len(), "Frame written");
            }
        });

        let mut decoder = FrameDecoder::with_buffer(leftover);
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        let result = 'connection: loop {
            loop {
                match decoder.decode() {
                    Ok(Some(Decoded::Text(text))) => self.spawn_dispatch(text, frames_tx.clone()),
                    Ok(Some(Decoded::Consumed)) => {}
                    Ok(Some(Decoded::Close)) => {
                        debug!(connection = %self.id, "Close frame received");
                        break 'connection Ok(());
                    }
                    Ok(None) => break,
                    Err(e) => break 'connection Err(e),
                }
            }

            match reader.read(&mut chunk).await {
                Ok(0) => {
                    debug!(connection = %self.id, "Client disconnected");
                    break Ok(());
                }
                Ok(n) => decoder.feed(&chunk[..n]),
                Err(e) => break Err(e.into()),
            }
        };

        writer_task.abort();
        result
    }

    /// Dispatches one message and queues its response.
    fn spawn_dispatch(&self, text: String, frames_tx: mpsc::UnboundedSender<Vec<u8>>) {
        let dispatcher = self.dispatcher.clone();
        let id = self.id;

        tokio::spawn(async move {
            let response = respond(&dispatcher, &text).await;
            match serde_json::to_string(&response) {
                Ok(json) => {
                    if frames_tx.send(codec::encode_text(&json)).is_err() {
                        trace!(connection = %id, "Connection closed before response");
                    }
                }
                Err(e) => warn!(connection = %id, error = %e, "Failed to serialize response"),
            }
        });
    }
}

/// Turns one text message into a JSON-RPC response.
///
/// Bodies that are not JSON yield `-32700` without reaching the dispatcher.
pub async fn respond(dispatcher: &MethodDispatcher, text: &str) -> RpcResponse {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => dispatcher.dispatch_value(value).await,
        Err(e) => {
            debug!(error = %e, "Unparsable request body");
            RpcResponse::parse_error()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
