//! Global log stream instances.
//!
//! One stream per producer thread, drained by the logger thread.

use crate::logging::LogStream;

/// Shell task stream: dispatches, busy discards, overflow bells.
pub static SHELL_LOG_STREAM: LogStream = LogStream::new();

/// Receive path stream: dropped input bytes, UART read errors.
pub static RX_LOG_STREAM: LogStream = LogStream::new();
