//! Request/response correlation for the extension channel.
//!
//! Every outbound request gets the next integer ID from this correlator's own
//! counter. The request stays pending until exactly one of these happens:
//!
//! | Event | Outcome |
//! |-------|---------|
//! | Response with matching `id` | resolved with `result`, or rejected with `error.message` |
//! | No response within the timeout | rejected with [`Error::RequestTimeout`] |
//! | Channel end-of-input | rejected with [`Error::ChannelLost`] |
//!
//! The correlator never retries; callers decide what to do with failures.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot::error::RecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{IdCounter, RequestId};
use crate::protocol::{Action, Request, Response};

use super::framing;

// ============================================================================
// Constants
// ============================================================================

/// Default time to wait for the extension to answer.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

// ============================================================================
// Types
// ============================================================================

/// Terminal state of a pending request.
#[derive(Debug)]
pub enum Outcome {
    /// The extension answered (successfully or not).
    Response(Response),
    /// The channel closed before an answer arrived.
    ChannelLost,
}

/// Map of request IDs to completion channels.
type PendingMap = FxHashMap<RequestId, oneshot::Sender<Outcome>>;

/// State guarded by one lock so a send can never slip in after a loss.
#[derive(Default)]
struct Shared {
    pending: PendingMap,
    closed: bool,
}

// ============================================================================
// RequestCorrelator
// ============================================================================

/// Issues IDs, tracks pending requests and matches responses.
///
/// One instance exists per IPC channel and is shared by every WebSocket
/// connection.
pub struct RequestCorrelator {
    /// ID source for this channel.
    ids: IdCounter,
    /// Pending requests and channel availability.
    shared: Mutex<Shared>,
    /// Encoded frames for the channel writer, in call order.
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    /// Per-request timeout.
    request_timeout: Duration,
}

impl RequestCorrelator {
    /// Creates a correlator writing encoded frames to `outbound`.
    #[must_use]
    pub fn new(outbound: mpsc::UnboundedSender<Vec<u8>>, request_timeout: Duration) -> Self {
        Self {
            ids: IdCounter::new(),
            shared: Mutex::new(Shared::default()),
            outbound,
            request_timeout,
        }
    }

    /// Returns the per-request timeout.
    #[inline]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns `true` until the channel is known to be closed.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.shared.lock().closed
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Sends an action to the extension and waits for its result.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelNotConnected`] if the channel is already closed
    /// - [`Error::ChannelLost`] if the channel closes while pending
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::Extension`] if the extension reports an error
    pub async fn send(&self, action: Action) -> Result<Value> {
        let (request_id, mut rx) = self.enqueue(action)?;

        let received = match timeout(self.request_timeout, &mut rx).await {
            Ok(received) => received,
            Err(_) => self.expire(request_id, rx).await?,
        };

        match received {
            Ok(Outcome::Response(response)) => response.into_result(),
            Ok(Outcome::ChannelLost) | Err(_) => Err(Error::ChannelLost),
        }
    }

    /// Removes a request whose deadline passed.
    ///
    /// A reply or channel loss that claimed the entry before the deadline was
    /// handled still wins over the timeout.
    async fn expire(
        &self,
        request_id: RequestId,
        rx: oneshot::Receiver<Outcome>,
    ) -> Result<std::result::Result<Outcome, RecvError>> {
        if self.shared.lock().pending.remove(&request_id).is_some() {
            debug!(%request_id, "Request timed out");
            return Err(Error::request_timeout(
                request_id,
                self.request_timeout.as_millis() as u64,
            ));
        }

        // The claimer sends right after releasing the lock.
        trace!(%request_id, "Outcome claimed at the deadline");
        Ok(rx.await)
    }

    /// Registers a pending request and queues its frame.
    fn enqueue(&self, action: Action) -> Result<(RequestId, oneshot::Receiver<Outcome>)> {
        let (tx, rx) = oneshot::channel();
        let mut shared = self.shared.lock();

        if shared.closed {
            return Err(Error::ChannelNotConnected);
        }

        let request_id = self.ids.next_request();
        let frame = framing::encode(&Request::new(request_id, action))?;

        shared.pending.insert(request_id, tx);
        if self.outbound.send(frame).is_err() {
            shared.pending.remove(&request_id);
            shared.closed = true;
            return Err(Error::ChannelNotConnected);
        }

        trace!(%request_id, "Request queued");
        Ok((request_id, rx))
    }

    /// Handles a decoded message from the extension.
    ///
    /// Messages without a numeric `id` are dropped.
    pub fn on_message(&self, message: Value) {
        match serde_json::from_value::<Response>(message) {
            Ok(response) => self.on_response(response),
            Err(e) => warn!(error = %e, "Dropping IPC message without request id"),
        }
    }

    /// Completes the pending request matching `response.id`.
    ///
    /// Unknown, late and duplicate IDs are ignored.
    pub fn on_response(&self, response: Response) {
        let request_id = response.id;
        let tx = self.shared.lock().pending.remove(&request_id);

        match tx {
            Some(tx) => {
                trace!(%request_id, error = response.is_error(), "Response matched");
                let _ = tx.send(Outcome::Response(response));
            }
            None => warn!(%request_id, "Response for unknown request"),
        }
    }

    /// Marks the channel closed and fails every pending request.
    pub fn on_channel_closed(&self) {
        let pending: Vec<_> = {
            let mut shared = self.shared.lock();
            shared.closed = true;
            shared.pending.drain().collect()
        };

        let count = pending.len();
        for (_, tx) in pending {
            let _ = tx.send(Outcome::ChannelLost);
        }

        debug!(count, "Extension channel closed");
    }
}

// ============================================================================
// Tests
// ============================================================================
