//! # vt100-shell
//!
//! Interactive command shell over a byte-oriented serial link.
//!
//! ## Architecture
//!
//! ```text
//! UART RX ─▶ InputQueue ─▶ EscapeDecoder ─▶ line editor ─▶ dispatcher ─▶ handler
//!                                               │                          │
//!                                               └────▶ printf ─▶ Sink ◀────┘
//! ```
//!
//! - One input stream, one editing buffer, synchronous handlers
//! - All text goes through the [`printf`] engine into a [`Sink`]
//! - No heap, all buffers sized at compile time (see [`config`])

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod input;
pub mod log_globals;
pub mod logging;
pub mod printf;
pub mod shell;
pub mod sink;
pub mod uart_logger;

pub use input::{InputQueue, CONSOLE_INPUT};
pub use log_globals::{RX_LOG_STREAM, SHELL_LOG_STREAM};
pub use printf::{format, snformat, Arg, SinkRefused};
pub use shell::{CommandDescriptor, Handler, Shell, ShellError, ShellResult, COMMANDS};
pub use sink::{BufferSink, EchoSink, Sink, Transmit};
