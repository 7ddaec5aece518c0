//! Incremental byte accumulator shared by the stream decoders.
//!
//! Bytes are appended as they arrive and consumed from the front with a
//! cursor. Consumed space is reclaimed lazily so that a long-lived connection
//! does not shift the whole buffer on every frame.

// ============================================================================
// Constants
// ============================================================================

/// Consumed prefix size above which the buffer is compacted.
const COMPACT_THRESHOLD: usize = 4096;

// ============================================================================
// FrameBuffer
// ============================================================================

/// Byte accumulator with cursor-based consumption.
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl FrameBuffer {
    /// Creates an empty buffer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends a chunk.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.compact();
        self.data.extend_from_slice(chunk);
    }

    /// Returns the unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    /// Returns the number of unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Returns `true` if no unconsumed bytes remain.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `n` unconsumed bytes starting at `offset`, if buffered.
    #[inline]
    #[must_use]
    pub fn peek(&self, offset: usize, n: usize) -> Option<&[u8]> {
        let end = offset.checked_add(n)?;
        self.remaining().get(offset..end)
    }

    /// Consumes `n` bytes and returns them.
    ///
    /// Returns `None` without consuming if fewer than `n` bytes are buffered.
    pub fn take(&mut self, n: usize) -> Option<&[u8]> {
        if self.len() < n {
            return None;
        }
        let start = self.cursor;
        self.cursor += n;
        Some(&self.data[start..self.cursor])
    }

    /// Drops `n` bytes (saturating at the buffered length).
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.data.len());
    }

    /// Reclaims consumed space.
    fn compact(&mut self) {
        if self.cursor == self.data.len() {
            self.data.clear();
            self.cursor = 0;
        } else if self.cursor >= COMPACT_THRESHOLD && self.cursor * 2 >= self.data.len() {
            self.data.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
