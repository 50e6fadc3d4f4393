//! Line buffer for shell input
//!
//! Fixed capacity, cursor-addressed. Bytes past the tail are kept zeroed so
//! the storage can be handed out as a NUL-terminated string at any time.

use crate::config::RX_BUFFER_SIZE;

/// Editable line with cursor
#[derive(Clone)]
pub struct LineBuffer<const N: usize = RX_BUFFER_SIZE> {
    buf: [u8; N],
    len: usize,
    cursor: usize,
}

impl<const N: usize> LineBuffer<N> {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
            cursor: 0,
        }
    }

    /// Maximum number of bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Insert a byte at the cursor, cursor moves past it.
    ///
    /// Returns `false` (buffer untouched) if full.
    pub fn insert(&mut self, c: u8) -> bool {
        if self.len == N {
            return false;
        }
        self.buf.copy_within(self.cursor..self.len, self.cursor + 1);
        self.buf[self.cursor] = c;
        self.len += 1;
        self.cursor += 1;
        true
    }

    /// Remove the byte before the cursor (backspace)
    pub fn remove_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at_cursor()
    }

    /// Remove the byte under the cursor (forward delete)
    pub fn remove_at_cursor(&mut self) -> bool {
        if self.cursor == self.len {
            return false;
        }
        self.buf.copy_within(self.cursor + 1..self.len, self.cursor);
        self.len -= 1;
        self.buf[self.len] = 0;
        true
    }

    /// Move cursor one left. Returns `false` at the start.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move cursor one right. Returns `false` at the tail.
    pub fn move_right(&mut self) -> bool {
        if self.cursor == self.len {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Move cursor to the start, returns distance moved
    pub fn move_home(&mut self) -> usize {
        core::mem::replace(&mut self.cursor, 0)
    }

    /// Move cursor to the tail, returns distance moved
    pub fn move_end(&mut self) -> usize {
        let moved = self.len - self.cursor;
        self.cursor = self.len;
        moved
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.buf[..self.len].fill(0);
        self.len = 0;
        self.cursor = 0;
    }

    /// Replace contents, cursor at the tail. Truncates to capacity.
    pub fn set(&mut self, bytes: &[u8]) {
        self.clear();
        let copy_len = bytes.len().min(N);
        self.buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.len = copy_len;
        self.cursor = copy_len;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Get raw bytes, mutable
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    /// Bytes from the cursor to the tail
    pub fn tail(&self) -> &[u8] {
        &self.buf[self.cursor..self.len]
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Cursor position, `0..=len`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if at capacity
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Check if cursor sits at the tail
    pub fn at_tail(&self) -> bool {
        self.cursor == self.len
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
