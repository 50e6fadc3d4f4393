//! Lock-free receive queue between the UART reader and the shell.
//!
//! # Architecture
//!
//! ```text
//! UART RX              InputQueue              Shell task
//! ───────              ──────────              ──────────
//!
//! push(byte) ───────▶ [b0][b1][b2] ───────▶ pop() ─▶ process_byte()
//! never blocks          lock-free               arrival order
//! drops if full         SPSC ring
//! ```
//!
//! # Rules
//!
//! - Exactly one producer and one consumer
//! - Push never blocks: a full queue drops the byte and counts it
//! - Bytes are consumed strictly in arrival order

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::INPUT_QUEUE_SIZE;

/// Bounded SPSC byte queue.
pub struct InputQueue<const N: usize = INPUT_QUEUE_SIZE> {
    slots: UnsafeCell<[u8; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Single producer owns write_idx and the slot it points at,
// single consumer owns read_idx. Slots are published via Release/Acquire.
unsafe impl<const N: usize> Sync for InputQueue<N> {}
unsafe impl<const N: usize> Send for InputQueue<N> {}

impl<const N: usize> InputQueue<N> {
    const MASK: usize = N - 1;

    /// Create a new empty queue.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Input queue size must be power of 2");

        Self {
            slots: UnsafeCell::new([0u8; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Deliver one received byte (producer side, never blocks).
    ///
    /// Returns `false` if the queue was full and the byte was dropped.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: Single producer, slot not visible to the consumer until
        // write_idx is published below.
        unsafe {
            (*self.slots.get())[(write as usize) & Self::MASK] = byte;
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Take the oldest byte (consumer side).
    #[inline]
    pub fn pop(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: Single consumer, slot published by the producer's Release store.
        let byte = unsafe { (*self.slots.get())[(read as usize) & Self::MASK] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Number of bytes waiting.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Check if there is nothing to pop.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Get count of dropped bytes.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for InputQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The console receive queue.
pub static CONSOLE_INPUT: InputQueue = InputQueue::new();
