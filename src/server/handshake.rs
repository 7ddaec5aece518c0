//! HTTP Upgrade to WebSocket.
//!
//! Runs once per accepted connection. A request without `Upgrade: websocket`
//! or without `Sec-WebSocket-Key` is closed without a response.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::transport::FrameBuffer;

// ============================================================================
// Constants
// ============================================================================

/// GUID appended to the client key before hashing (RFC 6455 section 1.3).
pub const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Maximum size of the HTTP request head.
pub const MAX_REQUEST_HEAD: usize = 8 * 1024;

// ============================================================================
// HandshakeRequest
// ============================================================================

/// The parts of the upgrade request the server needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// Value of `Sec-WebSocket-Key`.
    pub key: String,
}

impl HandshakeRequest {
    /// Parses a complete request head (without the terminating blank line).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Handshake`] if the upgrade headers are missing.
    pub fn parse(head: &str) -> Result<Self> {
        let mut upgrade = None;
        let mut key = None;

        for line in head.split("\r\n").skip(1) {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if name.trim().eq_ignore_ascii_case("upgrade") {
                upgrade = Some(value);
            } else if name.trim().eq_ignore_ascii_case("sec-websocket-key") {
                key = Some(value);
            }
        }

        match upgrade {
            Some(value) if value.eq_ignore_ascii_case("websocket") => {}
            Some(value) => return Err(Error::handshake(format!("unsupported upgrade: {value}"))),
            None => return Err(Error::handshake("missing Upgrade header")),
        }

        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::handshake("missing Sec-WebSocket-Key header"))?;

        Ok(Self {
            key: key.to_string(),
        })
    }

    /// Returns the `101 Switching Protocols` response.
    #[must_use]
    pub fn response(&self) -> String {
        format!(
            "HTTP/1.1 101 Switching Protocols\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Accept: {}\r\n\r\n",
            accept_key(&self.key)
        )
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Computes `Sec-WebSocket-Accept` for a client key.
#[must_use]
pub fn accept_key(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Returns the offset just past `\r\n\r\n`, if present.
fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Performs the server side of the handshake.
///
/// Returns the bytes received after the request head; they already belong to
/// the WebSocket frame stream.
///
/// # Errors
///
/// - [`Error::Handshake`] if the request is not a WebSocket upgrade, exceeds
///   [`MAX_REQUEST_HEAD`] or the peer disconnects first
/// - [`Error::Io`] if the socket fails
pub async fn accept<S>(stream: &mut S) -> Result<FrameBuffer>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut received = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(end) = find_head_end(&received) {
            break end;
        }
        if received.len() > MAX_REQUEST_HEAD {
            return Err(Error::handshake("request head too large"));
        }

        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(Error::handshake("connection closed during handshake"));
        }
        trace!(bytes = n, "Handshake bytes received");
        received.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&received[..head_end - 4])
        .map_err(|_| Error::handshake("request head is not UTF-8"))?;
    let request = HandshakeRequest::parse(head)?;

    stream.write_all(request.response().as_bytes()).await?;
    stream.flush().await?;
    debug!("WebSocket handshake completed");

    let mut leftover = FrameBuffer::new();
    leftover.extend(&received[head_end..]);
    Ok(leftover)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::duplex;

    const REQUEST: &str = "GET / HTTP/1.1\r\n\
                           Host: localhost:8080\r\n\
                           upgrade: WebSocket\r\n\
                           Connection: Upgrade\r\n\
                           Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                           Sec-WebSocket-Version: 13\r\n\r\n";

    #[test]
    fn test_accept_key_rfc_example() {
        assert_eq!(
            accept_key("dGhlIHNhbXBsZSBub25jZQ=="),
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let request = HandshakeRequest::parse(REQUEST.trim_end()).expect("parse");
        assert_eq!(request.key, "dGhlIHNhbXBsZSBub25jZQ==");
    }

    #[test]
    fn test_parse_rejects_missing_upgrade() {
        let head = "GET / HTTP/1.1\r\nSec-WebSocket-Key: abc";
        assert!(matches!(
            HandshakeRequest::parse(head),
            Err(Error::Handshake { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_other_upgrade() {
        let head = "GET / HTTP/1.1\r\nUpgrade: h2c\r\nSec-WebSocket-Key: abc";
        assert!(HandshakeRequest::parse(head).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        let head = "GET / HTTP/1.1\r\nUpgrade: websocket";
        assert!(HandshakeRequest::parse(head).is_err());
    }

    #[test]
    fn test_response_format() {
        let request = HandshakeRequest {
            key: "dGhlIHNhbXBsZSBub25jZQ==".to_string(),
        };
        let response = request.response();

        assert!(response.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
        assert!(response.contains("Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_accept_keeps_trailing_bytes() {
        let (mut client, mut server) = duplex(4096);
        let mut request = REQUEST.as_bytes().to_vec();
        request.extend_from_slice(&[0x81, 0x80]);
        client.write_all(&request).await.expect("write");

        let leftover = accept(&mut server).await.expect("handshake");
        assert_eq!(leftover.remaining(), &[0x81, 0x80]);

        let mut response = vec![0u8; 256];
        let n = client.read(&mut response).await.expect("read");
        let response = String::from_utf8_lossy(&response[..n]);
        assert!(response.contains("101 Switching Protocols"));
    }

    #[tokio::test]
    async fn test_accept_rejects_plain_http_without_response() {
        let (mut client, mut server) = duplex(4096);
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .expect("write");

        assert!(accept(&mut server).await.is_err());
        drop(server);

        let mut response = Vec::new();
        client.read_to_end(&mut response).await.expect("read");
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_accept_rejects_oversized_head() {
        let (mut client, mut server) = duplex(64 * 1024);
        client
            .write_all(&vec![b'a'; MAX_REQUEST_HEAD + 1024])
            .await
            .expect("write");

        assert!(matches!(
            accept(&mut server).await,
            Err(Error::Handshake { .. })
        ));
    }
}
