//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing IPC request IDs with connection IDs.
//!
//! | Type | Issued by | Purpose |
//! |------|-----------|---------|
//! | [`RequestId`] | `RequestCorrelator` | Matches extension responses to requests |
//! | [`ConnectionId`] | `McpServer` | Labels accepted WebSocket connections in logs |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Identifier of an outbound IPC request.
///
/// Serialized as a plain JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request ID from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ConnectionId
// ============================================================================

/// Identifier of an accepted WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ============================================================================
// IdCounter
// ============================================================================

/// Monotonic ID source.
///
/// Each owner holds its own counter; values are never reused.
#[derive(Debug, Default)]
pub struct IdCounter(AtomicU64);

impl IdCounter {
    /// Creates a counter starting at zero.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Issues the next request ID.
    #[inline]
    pub fn next_request(&self) -> RequestId {
        RequestId(self.0.fetch_add(1, Ordering::Relaxed))
    }

    /// Issues the next connection ID.
    #[inline]
    pub fn next_connection(&self) -> ConnectionId {
        ConnectionId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let counter = IdCounter::new();
        let first = counter.next_request();
        let second = counter.next_request();

        assert_eq!(first.as_u64(), 0);
        assert_eq!(second.as_u64(), 1);
    }

    #[test]
    fn test_counters_are_independent() {
        let a = IdCounter::new();
        let b = IdCounter::new();
        a.next_request();
        a.next_request();

        assert_eq!(b.next_request(), RequestId::new(0));
    }

    #[test]
    fn test_request_id_serializes_as_integer() {
        let json = serde_json::to_string(&RequestId::new(42)).expect("serialize");
        assert_eq!(json, "42");

        let id: RequestId = serde_json::from_str("42").expect("parse");
        assert_eq!(id, RequestId::new(42));
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestId::new(3).to_string(), "3");
        assert_eq!(IdCounter::new().next_connection().to_string(), "conn-0");
    }
}
