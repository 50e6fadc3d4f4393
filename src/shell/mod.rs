//! Serial command shell
//!
//! Raw bytes ──▶ escape decoder ──▶ line editor ──▶ dispatcher ──▶ handler
//!
//! Single session, no history. Zero heap allocation - all static buffers.

pub mod commands;
pub mod error;
pub mod escape;
pub mod line_buffer;
#[allow(clippy::module_inception)]
pub mod shell;

pub use commands::{dispatch, find, CommandDescriptor, Handler, Help, COMMANDS};
pub use error::{ShellError, ShellResult};
pub use escape::{Decoded, EscapeDecoder, EscapeState};
pub use line_buffer::LineBuffer;
pub use shell::Shell;
