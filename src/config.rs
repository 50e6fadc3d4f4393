//! Module: config
//!
//! Purpose: Build-time constants and runtime settings for the shell.
//!
//! Sizes are compile-time so every buffer is static, nothing on the heap.
//! The baud rate is a runtime value consumed by the firmware wiring.

/// Usable command line length (bytes). Must stay below 127.
pub const RX_BUFFER_SIZE: usize = 63;

/// Receive queue slots between the UART reader and the shell. Power of 2.
pub const INPUT_QUEUE_SIZE: usize = 32;

const _: () = assert!(RX_BUFFER_SIZE < 127);
const _: () = assert!(INPUT_QUEUE_SIZE.is_power_of_two());

/// Prompt shown after startup, every completed line and Ctrl-C.
pub const PROMPT: u8 = b'>';

/// Terminal bell, sent on overflow or an unhandled key.
pub const BELL: u8 = 0x07;

/// Name used in the welcome banner.
pub const SHELL_NAME: &str = "ESP32";

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Console UART settings.
///
/// The console pins are fixed per chip (U0TXD/U0RXD) and picked by the
/// `esp32s3`/`esp32p4` feature in the firmware wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellConfig {
    pub console_baud_rate: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self { console_baud_rate: 115200 }
    }
}
