//! TCP listener and accept loop.
//!
//! Every accepted socket gets a [`ConnectionId`] and its own task. A failed
//! handshake or a protocol violation ends only that connection.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              McpServer                  │
//! │          (127.0.0.1:8080)               │
//! │  ┌─────────────────────────────────┐    │
//! │  │ conn-0 → ConnectionPipeline     │    │
//! │  │ conn-1 → ConnectionPipeline     │    │     ┌──────────────────┐
//! │  │ conn-2 → ConnectionPipeline     │────┼────►│ MethodDispatcher │
//! │  └─────────────────────────────────┘    │     └──────────────────┘
//! └─────────────────────────────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::dispatch::MethodDispatcher;
use crate::error::{Error, Result};
use crate::identifiers::{ConnectionId, IdCounter};

use super::pipeline::ConnectionPipeline;

// ============================================================================
// Constants
// ============================================================================

/// Default bind address (localhost only).
pub const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default WebSocket port.
pub const DEFAULT_PORT: u16 = 8080;

/// How often the accept loop checks the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// McpServer
// ============================================================================

/// WebSocket server for MCP clients.
///
/// # Example
///
/// ```ignore
/// let server = McpServer::bind(DEFAULT_BIND_IP, DEFAULT_PORT, dispatcher).await?;
/// println!("Listening on {}", server.ws_url());
/// ```
pub struct McpServer {
    /// Bound address.
    local_addr: SocketAddr,

    /// Shared by every connection.
    dispatcher: MethodDispatcher,

    /// Connection id source.
    connection_ids: IdCounter,

    /// Shutdown flag.
    shutdown: AtomicBool,
}

// ============================================================================
// McpServer - Constructor
// ============================================================================

impl McpServer {
    /// Binds the listener and starts the accept loop.
    ///
    /// # Arguments
    ///
    /// * `ip` - IP address to bind to
    /// * `port` - Port to bind to (0 for random)
    /// * `dispatcher` - Handles requests from every connection
    ///
    /// # Errors
    ///
    /// - [`Error::PortInUse`] if another process holds the port
    /// - [`Error::Io`] for any other bind failure
    pub async fn bind(ip: IpAddr, port: u16, dispatcher: MethodDispatcher) -> Result<Arc<Self>> {
        let addr = SocketAddr::new(ip, port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            if e.kind() == ErrorKind::AddrInUse {
                Error::port_in_use(port)
            } else {
                Error::Io(e)
            }
        })?;
        let local_addr = listener.local_addr()?;

        let server = Arc::new(Self {
            local_addr,
            dispatcher,
            connection_ids: IdCounter::new(),
            shutdown: AtomicBool::new(false),
        });

        let server_clone = Arc::clone(&server);
        tokio::spawn(async move {
            server_clone.accept_loop(listener).await;
        });

        info!(%local_addr, "MCP server listening");

        Ok(server)
    }
}

// ============================================================================
// McpServer - Public API
// ============================================================================

impl McpServer {
    /// Returns the bound port.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Returns the bound address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the WebSocket URL clients connect to.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    #[inline]
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Stops accepting new connections.
    ///
    /// Open connections run until their clients disconnect.
    pub fn shutdown(&self) {
        info!("MCP server shutting down");
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// McpServer - Accept Loop
// ============================================================================

impl McpServer {
    /// Background task that accepts new connections.
    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        debug!("Accept loop started");

        loop {
            if self.is_shutdown() {
                debug!("Accept loop shutting down");
                break;
            }

            // Timeout lets the loop observe the shutdown flag.
            match timeout(SHUTDOWN_POLL_INTERVAL, listener.accept()).await {
                Ok(Ok((stream, addr))) => {
                    let id = self.connection_ids.next_connection();
                    debug!(connection = %id, ?addr, "TCP connection accepted");

                    let dispatcher = self.dispatcher.clone();
                    tokio::spawn(async move {
                        handle_connection(id, stream, addr, dispatcher).await;
                    });
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Accept failed");
                }
                Err(_) => continue,
            }
        }
    }
}

/// Runs one connection to completion.
async fn handle_connection(
    id: ConnectionId,
    stream: TcpStream,
    addr: SocketAddr,
    dispatcher: MethodDispatcher,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(connection = %id, error = %e, "Failed to set TCP_NODELAY");
    }

    match ConnectionPipeline::new(id, dispatcher).serve(stream).await {
        Ok(()) => debug!(connection = %id, "Connection closed"),
        Err(e) if e.is_websocket_error() => {
            debug!(connection = %id, ?addr, error = %e, "Connection rejected");
        }
        Err(e) => warn!(connection = %id, ?addr, error = %e, "Connection failed"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::mpsc;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    use crate::dispatch::BrowserLauncher;
    use crate::protocol::rpc::{METHOD_NOT_FOUND, PARSE_ERROR};
    use crate::server::codec;
    use crate::transport::RequestCorrelator;
    use crate::transport::IpcDecoder;

    struct NoopLauncher;

    impl BrowserLauncher for NoopLauncher {
        fn launch(&self, _url: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Starts a server on a random port with an extension that echoes the URL.
    async fn start() -> Arc<McpServer> {
        let (tx, mut frames) = mpsc::unbounded_channel::<Vec<u8>>();
        let correlator = Arc::new(RequestCorrelator::new(tx, Duration::from_secs(5)));

        let extension = Arc::clone(&correlator);
        tokio::spawn(async move {
            let mut decoder = IpcDecoder::new();
            while let Some(frame) = frames.recv().await {
                for request in decoder.feed(&frame) {
                    extension.on_message(json!({
                        "id": request["id"],
                        "result": {"opened": request["params"]["url"]},
                    }));
                }
            }
        });

        let dispatcher = MethodDispatcher::new(correlator, Arc::new(NoopLauncher));
        McpServer::bind(DEFAULT_BIND_IP, 0, dispatcher)
            .await
            .expect("bind should succeed")
    }

    async fn call(
        ws: &mut tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<TcpStream>,
        >,
        request: Value,
    ) -> Value {
        ws.send(Message::text(request.to_string()))
            .await
            .expect("send");
        loop {
            match ws.next().await.expect("message").expect("frame") {
                Message::Text(text) => return serde_json::from_str(&text).expect("json"),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_bind_random_port() {
        let server = start().await;
        assert!(server.port() > 0);
        assert!(server.ws_url().starts_with("ws://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let server = start().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let dispatcher = MethodDispatcher::new(
            Arc::new(RequestCorrelator::new(tx, Duration::from_secs(5))),
            Arc::new(NoopLauncher),
        );

        let result = McpServer::bind(DEFAULT_BIND_IP, server.port(), dispatcher).await;
        assert!(matches!(result, Err(Error::PortInUse { port }) if port == server.port()));
    }

    #[tokio::test]
    async fn test_tools_list_and_call() {
        let server = start().await;
        let (mut ws, _) = connect_async(server.ws_url()).await.expect("connect");

        let listed = call(&mut ws, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;
        assert_eq!(listed["result"]["tools"][0]["name"], "browser.openUrl");

        let opened = call(
            &mut ws,
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": {"name": "browser.openUrl", "arguments": {"url": "https://example.com"}},
            }),
        )
        .await;
        assert_eq!(opened["id"], 2);
        assert_eq!(opened["result"], json!({"opened": "https://example.com"}));
    }

    #[tokio::test]
    async fn test_errors_over_websocket() {
        let server = start().await;
        let (mut ws, _) = connect_async(server.ws_url()).await.expect("connect");

        let response = call(&mut ws, json!({"jsonrpc": "2.0", "id": 9, "method": "foo/bar"})).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        ws.send(Message::text("not json")).await.expect("send");
        let Some(Ok(Message::Text(text))) = ws.next().await else {
            panic!("expected text response");
        };
        let response: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(response["error"]["code"], PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_concurrent_connections() {
        let server = start().await;

        let mut tasks = Vec::new();
        for n in 0..4 {
            let url = server.ws_url();
            tasks.push(tokio::spawn(async move {
                let (mut ws, _) = connect_async(url).await.expect("connect");
                let target = format!("https://example.com/{n}");
                let response = call(
                    &mut ws,
                    json!({
                        "jsonrpc": "2.0",
                        "id": n,
                        "method": "tools/call",
                        "params": {"name": "browser.openUrl", "arguments": {"url": target}},
                    }),
                )
                .await;
                (n, response)
            }));
        }

        for task in tasks {
            let (n, response) = task.await.expect("join");
            assert_eq!(response["id"], n);
            assert_eq!(
                response["result"]["opened"],
                format!("https://example.com/{n}")
            );
        }
    }

    #[tokio::test]
    async fn test_unmasked_frame_closes_connection() {
        let server = start().await;
        let (mut ws, _) = connect_async(server.ws_url()).await.expect("connect");
        let mut raw = TcpStream::connect(server.local_addr()).await.expect("connect");

        raw.write_all(
            b"GET / HTTP/1.1\r\nHost: localhost\r\nUpgrade: websocket\r\n\
              Connection: Upgrade\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
              Sec-WebSocket-Version: 13\r\n\r\n",
        )
        .await
        .expect("write");

        let mut head = Vec::new();
        while !head.ends_with(b"\r\n\r\n") {
            head.push(raw.read_u8().await.expect("read"));
        }
        assert!(head.starts_with(b"HTTP/1.1 101"));

        raw.write_all(&codec::encode_text(r#"{"id":1,"method":"tools/list"}"#))
            .await
            .expect("write");

        let mut rest = Vec::new();
        raw.read_to_end(&mut rest).await.expect("read");
        assert!(rest.is_empty());

        // Other connections are unaffected.
        let response = call(&mut ws, json!({"id": 3, "method": "tools/list"})).await;
        assert_eq!(response["id"], 3);
    }

    #[tokio::test]
    async fn test_bad_handshake_gets_no_response() {
        let server = start().await;
        let mut raw = TcpStream::connect(server.local_addr()).await.expect("connect");

        raw.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .expect("write");

        let mut rest = Vec::new();
        raw.read_to_end(&mut rest).await.expect("read");
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let server = start().await;
        server.shutdown();
        assert!(server.is_shutdown());

        tokio::time::sleep(SHUTDOWN_POLL_INTERVAL * 3).await;
        assert!(TcpStream::connect(server.local_addr()).await.is_err());
    }
}
