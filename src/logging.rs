//! Non-blocking logging for the shell.
//!
//! # Architecture
//!
//! ```text
//! Shell / RX path          LogStream             Logger thread
//! ───────────────          ─────────             ─────────────
//!
//! rt_log!() ────────────▶ [L0][L1][L2] ────────▶ debug UART TX
//! never blocks              lock-free             blocking ok
//! ```
//!
//! # Rules
//!
//! - The console UART carries shell traffic only, diagnostics go to the
//!   debug UART via these streams
//! - Logging never blocks the byte path: messages are dropped if the ring
//!   is full, and the drop is counted

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 120;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// Single-letter tag used on the debug UART, e.g. `(W)`.
    pub fn tag(self) -> u8 {
        self.as_str().as_bytes()[0]
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message bytes.
    pub fn message(&self) -> &[u8] {
        &self.msg[..self.len as usize]
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log stream (multiple producers, single consumer).
///
/// - Producers claim a position with compare_exchange on write_idx
/// - Each slot carries a stamp: the drain only reads a slot once its
///   producer has finished writing and stamped it ready
/// - Push never blocks (drops message if full)
/// - The logger thread drains at leisure
///
/// Slot `i` at position `pos` (`pos & MASK == i`) is free when its stamp is
/// `pos - i` and ready when it is `pos - i + 1`. Draining advances the stamp
/// by a full lap.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    stamps: [AtomicU32; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: A producer owns a slot from winning the compare_exchange on
// write_idx until its Release store of the ready stamp. The single consumer
// owns it from the Acquire load of that stamp until it stores the next lap.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

#[allow(clippy::declare_interior_mutable_const)]
const STAMP_INIT: AtomicU32 = AtomicU32::new(0);

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            stamps: [STAMP_INIT; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Stamp value of a free slot at `pos`.
    #[inline]
    fn free_stamp(pos: u32) -> u32 {
        pos.wrapping_sub((pos as usize & Self::MASK) as u32)
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut pos = self.write_idx.load(Ordering::Relaxed);
        loop {
            let idx = (pos as usize) & Self::MASK;
            let stamp = self.stamps[idx].load(Ordering::Acquire);
            let lag = stamp.wrapping_sub(Self::free_stamp(pos)) as i32;

            if lag < 0 {
                // Slot still holds last lap's entry
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            if lag > 0 {
                // Another producer claimed this position
                pos = self.write_idx.load(Ordering::Relaxed);
                continue;
            }

            match self.write_idx.compare_exchange_weak(
                pos,
                pos.wrapping_add(1),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => pos = current,
            }
        }

        let idx = (pos as usize) & Self::MASK;

        // SAFETY: Position claimed by the compare_exchange above and the slot
        // is free, so neither other producers nor the consumer touch it
        // until the ready stamp is published.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        self.stamps[idx].store(Self::free_stamp(pos).wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain next log entry (for the logger thread).
    ///
    /// Returns `None` if no entries available. A claimed slot whose producer
    /// is still writing counts as not available yet.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let pos = self.read_idx.load(Ordering::Relaxed);
        let idx = (pos as usize) & Self::MASK;
        let ready = Self::free_stamp(pos).wrapping_add(1);

        if self.stamps[idx].load(Ordering::Acquire) != ready {
            return None;
        }

        // SAFETY: Single consumer, slot published by the producer's Release
        // store of the ready stamp.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.stamps[idx].store(Self::free_stamp(pos).wrapping_add(N as u32), Ordering::Release);
        self.read_idx.store(pos.wrapping_add(1), Ordering::Relaxed);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl Write for BufWriter<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Microseconds since boot (always 0 off-device).
#[inline]
pub fn timestamp_us() -> i64 {
    #[cfg(target_os = "espidf")]
    {
        // SAFETY: esp_timer_get_time has no preconditions
        unsafe { esp_idf_svc::sys::esp_timer_get_time() }
    }

    #[cfg(not(target_os = "espidf"))]
    {
        0
    }
}

/// Non-blocking log macro.
///
/// # Example
///
/// ```ignore
/// rt_log!(LogLevel::Info, SHELL_LOG_STREAM, timestamp_us(), "cmd {}", name);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

/// Info log.
#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $timestamp, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $timestamp, $($arg)*)
    };
}

/// Error log.
#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $timestamp, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $timestamp, $($arg)*)
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"dispatch HELP"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), b"dispatch HELP");

        assert!(!stream.has_entries());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::<4>::new();

        assert!(stream.push(1, LogLevel::Info, b"1"));
        assert!(stream.push(2, LogLevel::Info, b"2"));
        assert!(stream.push(3, LogLevel::Info, b"3"));
        assert!(stream.push(4, LogLevel::Info, b"4"));

        // Should drop
        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);

        // Drain one, should be able to push again
        stream.drain();
        assert!(stream.push(6, LogLevel::Info, b"6"));

        stream.reset_dropped();
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::<4>::new();
        let long = [b'x'; MAX_MSG_LEN + 10];

        assert!(stream.push(0, LogLevel::Warn, &long));
        assert_eq!(stream.drain().unwrap().len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("dropped {}", 42));
        assert_eq!(&buf[..len], b"dropped 42");
    }

    #[test]
    fn test_log_level_tags() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Trace);
        assert_eq!(LogLevel::Warn.tag(), b'W');
        assert_eq!(LogLevel::Info.tag(), b'I');
    }

    #[test]
    fn test_rt_macros() {
        let stream = LogStream::<8>::new();

        crate::rt_warn!(stream, 7, "busy, {} discarded", "line");
        crate::rt_debug!(stream, 8, "key 0x{:02x}", 0x1Bu8);

        let first = stream.drain().unwrap();
        assert_eq!(first.level, LogLevel::Warn);
        assert_eq!(first.message(), b"busy, line discarded");
        assert_eq!(stream.drain().unwrap().message(), b"key 0x1b");
    }

    #[test]
    fn test_multiple_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let mut handles = vec![];

        for i in 0..4 {
            let stream = Arc::clone(&stream);
            handles.push(thread::spawn(move || {
                for j in 0..10 {
                    let msg = format!("Thread {} msg {}", i, j);
                    stream.push(j as i64, LogLevel::Info, msg.as_bytes());
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 40, "All messages should be present");
    }

    #[test]
    fn test_claimed_slot_not_drained_until_written() {
        let stream = LogStream::<4>::new();

        // A producer has claimed position 0 but not finished writing it
        stream.write_idx.store(1, Ordering::Relaxed);
        assert!(stream.drain().is_none());

        // The next producer lands behind it and stays invisible too
        assert!(stream.push(2, LogLevel::Info, b"second"));
        assert!(stream.drain().is_none());

        // First producer publishes (empty entry), both come out in order
        stream.stamps[0].store(1, Ordering::Release);
        assert_eq!(stream.drain().unwrap().message(), b"");
        assert_eq!(stream.drain().unwrap().message(), b"second");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_wraps_many_laps() {
        let stream = LogStream::<4>::new();

        for lap in 0..50i64 {
            assert!(stream.push(lap, LogLevel::Debug, b"a"));
            assert!(stream.push(lap, LogLevel::Debug, b"b"));
            assert_eq!(stream.drain().unwrap().message(), b"a");
            assert_eq!(stream.drain().unwrap().timestamp_us, lap);
        }
        assert_eq!(stream.dropped(), 0);
        assert_eq!(stream.pending(), 0);
    }

    #[test]
    fn test_concurrent_drain_sees_whole_entries() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<8>::new());
        let done = Arc::new(AtomicBool::new(false));

        let producers: Vec<_> = (0..2)
            .map(|t| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for n in 0..2000i64 {
                        // Message body is derived from the timestamp
                        let ts = t * 100_000 + n;
                        let msg = format!("entry {}", ts);
                        while !stream.push(ts, LogLevel::Info, msg.as_bytes()) {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        let consumer = {
            let stream = Arc::clone(&stream);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = 0;
                loop {
                    match stream.drain() {
                        Some(entry) => {
                            let expected = format!("entry {}", entry.timestamp_us);
                            assert_eq!(entry.message(), expected.as_bytes(), "torn entry");
                            seen += 1;
                        }
                        None if done.load(Ordering::Acquire) && !stream.has_entries() => break,
                        None => thread::yield_now(),
                    }
                }
                seen
            })
        };

        for p in producers {
            p.join().unwrap();
        }
        done.store(true, Ordering::Release);

        assert_eq!(consumer.join().unwrap(), 4000);
    }
}
