//! Output sinks for the formatted output engine.
//!
//! Every byte the shell produces (echo, redraw escapes, prompts, command
//! output) is funneled through a [`Sink`], one byte at a time.
//!
//! # Contract
//!
//! ```text
//! emit(byte) ──▶  > 0   bytes accepted, keep going
//!                 <= 0  refused (backpressure or transport failure)
//! ```
//!
//! A refusal aborts the current formatting call. Nothing is retried.

/// Single-byte output capability.
pub trait Sink {
    /// Emit one byte.
    ///
    /// Returns the number of bytes sent. A value `<= 0` means the sink
    /// refuses further output for the current call.
    fn emit(&mut self, byte: u8) -> i32;
}

impl<T: Sink + ?Sized> Sink for &mut T {
    #[inline]
    fn emit(&mut self, byte: u8) -> i32 {
        (**self).emit(byte)
    }
}

/// Bounded buffer sink (the `snprintf` realization).
///
/// Writes at most `buf.len() - 1` bytes and keeps the buffer NUL-terminated
/// after every byte. Once full it refuses, which the engine turns into a
/// silent truncation.
pub struct BufferSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> BufferSink<'a> {
    /// Wrap a buffer. The buffer starts out as an empty NUL-terminated string.
    pub fn new(buf: &'a mut [u8]) -> Self {
        if let Some(first) = buf.first_mut() {
            *first = 0;
        }
        Self { buf, pos: 0 }
    }

    /// Bytes written so far, excluding the terminator.
    #[inline]
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Check if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Written bytes, excluding the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Written bytes as a string slice.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }
}

impl Sink for BufferSink<'_> {
    fn emit(&mut self, byte: u8) -> i32 {
        // Keep one slot for the terminator
        if self.pos + 1 >= self.buf.len() {
            return 0;
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        self.buf[self.pos] = 0;
        1
    }
}

/// Byte transport (UART TX, socket, stdout on host).
pub trait Transmit {
    /// Send one byte. Returns `false` if the transport refused it.
    fn transmit(&mut self, byte: u8) -> bool;
}

impl<T: Transmit + ?Sized> Transmit for &mut T {
    #[inline]
    fn transmit(&mut self, byte: u8) -> bool {
        (**self).transmit(byte)
    }
}

/// Transport echo sink: forwards each byte to the installed transport.
///
/// With no transport installed every byte is refused.
pub struct EchoSink<T: Transmit> {
    tx: Option<T>,
}

impl<T: Transmit> EchoSink<T> {
    /// Create a sink forwarding to `tx`.
    pub const fn new(tx: T) -> Self {
        Self { tx: Some(tx) }
    }

    /// Create a sink with no transport attached.
    pub const fn detached() -> Self {
        Self { tx: None }
    }

    /// Install (or replace) the transport.
    pub fn attach(&mut self, tx: T) {
        self.tx = Some(tx);
    }

    /// Remove the transport, returning it.
    pub fn detach(&mut self) -> Option<T> {
        self.tx.take()
    }

    /// Access the installed transport.
    pub fn transport(&self) -> Option<&T> {
        self.tx.as_ref()
    }
}

impl<T: Transmit> Sink for EchoSink<T> {
    fn emit(&mut self, byte: u8) -> i32 {
        match self.tx.as_mut().map(|tx| tx.transmit(byte)) {
            Some(true) => 1,
            _ => 0,
        }
    }
}
