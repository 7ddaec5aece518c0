//! JSON-RPC method dispatcher.
//!
//! # Method Table
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `tools/list` | none | tool catalog |
//! | `tools/call` | `{name, arguments}` | extension result, or fallback result |
//!
//! A `browser.openUrl` call goes to the extension first. If the extension
//! cannot answer (timeout, channel lost, or error reply) the browser is
//! spawned directly and a synthetic success is returned:
//!
//! ```json
//! { "status": "ok", "launched": true, "url": "https://example.com" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{Action, RpcRequest, RpcResponse};
use crate::transport::RequestCorrelator;

use super::launcher::BrowserLauncher;
use super::tools::{self, OPEN_URL_TOOL, ToolCall};

// ============================================================================
// MethodDispatcher
// ============================================================================

/// Routes JSON-RPC requests to their handlers.
///
/// Shared by every WebSocket connection.
#[derive(Clone)]
pub struct MethodDispatcher {
    /// Extension channel.
    correlator: Arc<RequestCorrelator>,
    /// Fallback when the extension is unavailable.
    launcher: Arc<dyn BrowserLauncher>,
}

impl MethodDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(correlator: Arc<RequestCorrelator>, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            correlator,
            launcher,
        }
    }

    /// Handles a parsed JSON value that should be a request object.
    ///
    /// Values that are not request objects yield `-32600`.
    pub async fn dispatch_value(&self, value: Value) -> RpcResponse {
        let id = value.get("id").cloned().unwrap_or(Value::Null);

        match serde_json::from_value::<RpcRequest>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => RpcResponse::from_error(id, &Error::invalid_request(e.to_string())),
        }
    }

    /// Handles one request and wraps the outcome in a response envelope.
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let RpcRequest {
            id, method, params, ..
        } = request;
        debug!(%method, "Dispatching request");

        match self.call(&method, params).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(e) => {
                debug!(%method, error = %e, "Request failed");
                RpcResponse::from_error(id, &e)
            }
        }
    }

    /// Looks up and runs the handler for `method`.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            "tools/list" => Ok(tools::list()),
            "tools/call" => self.call_tool(params).await,
            other => Err(Error::method_not_found(other)),
        }
    }

    /// Handles `tools/call`.
    async fn call_tool(&self, params: Value) -> Result<Value> {
        let call = ToolCall::from_params(params)?;
        if call.name != OPEN_URL_TOOL {
            return Err(Error::tool_not_found(call.name));
        }

        let url = call.url_argument()?;
        Ok(self.open_url(url).await)
    }

    /// Opens `url` through the extension, falling back to a direct launch.
    async fn open_url(&self, url: String) -> Value {
        match self.correlator.send(Action::open_url(url.clone())).await {
            Ok(result) => result,
            Err(e) => {
                info!(error = %e, %url, "Extension unavailable, launching browser");
                if let Err(e) = self.launcher.launch(&url) {
                    warn!(error = %e, %url, "Fallback launch failed");
                }
                json!({ "status": "ok", "launched": true, "url": url })
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use crate::protocol::rpc::{INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND};
    use crate::transport::framing::IpcDecoder;

    /// Records launched URLs instead of spawning processes.
    #[derive(Default)]
    struct RecordingLauncher {
        launched: Mutex<Vec<String>>,
    }

    impl BrowserLauncher for RecordingLauncher {
        fn launch(&self, url: &str) -> Result<()> {
            self.launched.lock().push(url.to_string());
            Ok(())
        }
    }

    struct Fixture {
        dispatcher: MethodDispatcher,
        correlator: Arc<RequestCorrelator>,
        launcher: Arc<RecordingLauncher>,
        frames: mpsc::UnboundedReceiver<Vec<u8>>,
    }

    fn fixture() -> Fixture {
        let (tx, frames) = mpsc::unbounded_channel();
        let correlator = Arc::new(RequestCorrelator::new(tx, Duration::from_millis(5000)));
        let launcher = Arc::new(RecordingLauncher::default());
        let dispatcher = MethodDispatcher::new(Arc::clone(&correlator), launcher.clone());

        Fixture {
            dispatcher,
            correlator,
            launcher,
            frames,
        }
    }

    fn open_url_call(url: &str) -> RpcRequest {
        RpcRequest::new(
            1,
            "tools/call",
            json!({"name": "browser.openUrl", "arguments": {"url": url}}),
        )
    }

    /// Answers every request frame with the given reply body.
    fn spawn_extension(
        correlator: Arc<RequestCorrelator>,
        mut frames: mpsc::UnboundedReceiver<Vec<u8>>,
        reply: impl Fn(&Value) -> Value + Send + 'static,
    ) {
        tokio::spawn(async move {
            let mut decoder = IpcDecoder::new();
            while let Some(frame) = frames.recv().await {
                for request in decoder.feed(&frame) {
                    let mut response = reply(&request);
                    response["id"] = request["id"].clone();
                    correlator.on_message(response);
                }
            }
        });
    }

    #[tokio::test]
    async fn test_tools_list() {
        let fx = fixture();
        let response = fx
            .dispatcher
            .dispatch(RpcRequest::new(7, "tools/list", Value::Null))
            .await;

        assert_eq!(response.id, json!(7));
        let result = response.result.expect("result");
        assert_eq!(result["tools"][0]["name"], "browser.openUrl");
    }

    #[tokio::test]
    async fn test_open_url_returns_extension_result_verbatim() {
        let fx = fixture();
        spawn_extension(Arc::clone(&fx.correlator), fx.frames, |request| {
            assert_eq!(request["action"], "openUrl");
            json!({"result": {"status": "ok", "url": request["params"]["url"]}})
        });

        let response = fx.dispatcher.dispatch(open_url_call("https://example.com")).await;

        assert_eq!(
            response.result,
            Some(json!({"status": "ok", "url": "https://example.com"}))
        );
        assert!(fx.launcher.launched.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_url_falls_back_on_timeout() {
        let fx = fixture();
        let _frames = fx.frames;

        let response = fx.dispatcher.dispatch(open_url_call("https://example.com")).await;

        assert_eq!(
            response.result,
            Some(json!({"status": "ok", "launched": true, "url": "https://example.com"}))
        );
        assert_eq!(*fx.launcher.launched.lock(), vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_open_url_falls_back_when_channel_lost() {
        let fx = fixture();
        fx.correlator.on_channel_closed();

        let response = fx.dispatcher.dispatch(open_url_call("https://example.com")).await;

        assert_eq!(response.result.expect("result")["launched"], true);
        assert_eq!(fx.launcher.launched.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_open_url_falls_back_on_extension_error() {
        let fx = fixture();
        spawn_extension(Arc::clone(&fx.correlator), fx.frames, |_| {
            json!({"error": {"message": "windows API unavailable"}})
        });

        let response = fx.dispatcher.dispatch(open_url_call("https://example.com")).await;

        assert_eq!(response.result.expect("result")["launched"], true);
        assert_eq!(fx.launcher.launched.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let fx = fixture();
        let response = fx
            .dispatcher
            .dispatch(RpcRequest::new(3, "foo/bar", Value::Null))
            .await;

        let error = response.error.expect("error");
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert_eq!(response.id, json!(3));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let fx = fixture();
        let response = fx
            .dispatcher
            .dispatch(RpcRequest::new(
                4,
                "tools/call",
                json!({"name": "browser.close", "arguments": {}}),
            ))
            .await;

        let error = response.error.expect("error");
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Tool not found: browser.close");
        assert!(fx.launcher.launched.lock().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_argument() {
        let fx = fixture();
        let response = fx.dispatcher.dispatch(open_url_call("not a url")).await;

        assert_eq!(response.error.map(|e| e.code), Some(INVALID_PARAMS));
        assert_eq!(fx.correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_value_rejects_non_request() {
        let fx = fixture();
        let response = fx.dispatcher.dispatch_value(json!({"id": 5, "params": {}})).await;

        assert_eq!(response.id, json!(5));
        assert_eq!(response.error.map(|e| e.code), Some(INVALID_REQUEST));

        let response = fx.dispatcher.dispatch_value(json!([1, 2, 3])).await;
        assert_eq!(response.id, Value::Null);
        assert!(response.is_error());
    }
}
