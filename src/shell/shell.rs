//! Shell session: line editor driving the escape decoder and dispatcher

use super::commands::{dispatch, CommandDescriptor};
use super::error::result_text;
use super::escape::{
    Decoded, EscapeDecoder, KEY_BACKSPACE, KEY_DELETE, KEY_END, KEY_EOT, KEY_HOME,
    KEY_INTERRUPT, KEY_LEFT, KEY_RIGHT,
};
use super::{LineBuffer, ShellResult};
use crate::config::{BELL, PROMPT, RX_BUFFER_SIZE, SHELL_NAME};
use crate::logging::timestamp_us;
use crate::printf::{put_byte, put_bytes, put_str};
use crate::sink::Sink;
use crate::{rt_debug, rt_warn, shell_printf, SHELL_LOG_STREAM};

/// Shell state machine.
///
/// One instance per input stream. Feed it raw bytes with
/// [`process_byte`](Self::process_byte); everything it prints goes to the
/// sink installed at construction.
pub struct Shell<'c, S: Sink, const N: usize = RX_BUFFER_SIZE> {
    /// Line being edited
    line: LineBuffer<N>,
    /// Snapshot handed to the dispatcher
    committed: LineBuffer<N>,
    decoder: EscapeDecoder,
    commands: &'c [CommandDescriptor],
    sink: S,
    /// A handler is running
    busy: bool,
    /// Previous resolved byte was CR
    last_was_cr: bool,
}

impl<'c, S: Sink, const N: usize> Shell<'c, S, N> {
    /// Create a shell with cleared state writing to `sink`.
    ///
    /// Nothing is printed until [`start`](Self::start).
    pub fn new(sink: S, commands: &'c [CommandDescriptor]) -> Self {
        Self {
            line: LineBuffer::new(),
            committed: LineBuffer::new(),
            decoder: EscapeDecoder::new(),
            commands,
            sink,
            busy: false,
            last_was_cr: false,
        }
    }

    /// Print welcome banner and the first prompt
    pub fn start(&mut self) {
        let _ = shell_printf!(&mut self.sink, "\r\n\r\nWelcome to %s shell\r\n", SHELL_NAME);
        self.show_prompt();
    }

    /// Process a single received byte
    pub fn process_byte(&mut self, byte: u8) {
        let Decoded::Resolved(key) = self.decoder.feed(byte) else {
            return;
        };
        let after_cr = core::mem::replace(&mut self.last_was_cr, key == b'\r');

        match key {
            KEY_INTERRUPT => {
                self.line.clear();
                self.puts("^C\r\n");
                self.show_prompt();
            }
            KEY_BACKSPACE => self.backspace(),
            KEY_EOT | KEY_DELETE => self.delete(),
            KEY_LEFT => {
                if self.line.move_left() {
                    self.puts("\x1B[D");
                }
            }
            KEY_RIGHT => {
                if self.line.move_right() {
                    self.puts("\x1B[C");
                }
            }
            KEY_HOME => {
                let moved = self.line.move_home();
                self.cursor_left(moved);
            }
            KEY_END => {
                let moved = self.line.move_end();
                if moved > 0 {
                    let _ = shell_printf!(&mut self.sink, "\x1B[%uC", moved);
                }
            }
            b'\r' | b'\n' => {
                // CRLF terminals: the line went out on CR
                if key == b'\n' && after_cr && self.line.is_empty() {
                    return;
                }
                self.enter();
            }
            0x20..=0x7E => self.insert(key),
            _ => self.bell(),
        }
    }

    fn insert(&mut self, c: u8) {
        if self.line.is_full() {
            rt_debug!(SHELL_LOG_STREAM, timestamp_us(), "line full, dropped 0x{:02x}", c);
            self.bell();
            return;
        }

        let start = self.line.cursor();
        let at_tail = self.line.at_tail();
        self.line.insert(c);

        if at_tail {
            let _ = put_byte(&mut self.sink, c);
        } else {
            // Redraw from the new byte to the tail, then step back so the
            // cursor lands right after the inserted byte
            let redrawn = &self.line.as_bytes()[start..];
            let _ = put_bytes(&mut self.sink, redrawn);
            let back = redrawn.len() - 1;
            self.cursor_left(back);
        }
    }

    fn backspace(&mut self) {
        if self.line.cursor() == 0 {
            return;
        }

        if self.line.at_tail() {
            self.line.remove_before_cursor();
            self.puts("\x08 \x08");
        } else {
            self.line.move_left();
            self.puts("\x1B[D");
            self.line.remove_at_cursor();
            self.redraw_tail();
        }
    }

    fn delete(&mut self) {
        if self.line.remove_at_cursor() {
            self.redraw_tail();
        }
    }

    /// Reprint cursor..tail plus a blank over the vacated cell, then return
    fn redraw_tail(&mut self) {
        let tail = self.line.tail();
        let _ = put_bytes(&mut self.sink, tail);
        let back = tail.len() + 1;
        let _ = put_byte(&mut self.sink, b' ');
        self.cursor_left(back);
    }

    fn enter(&mut self) {
        self.puts("\r\n");

        if self.line.is_empty() {
            self.show_prompt();
            return;
        }

        if self.busy {
            rt_warn!(SHELL_LOG_STREAM, timestamp_us(), "busy, line discarded");
            self.line.clear();
            return;
        }

        self.committed.set(self.line.as_bytes());
        self.line.clear();
        self.execute();
    }

    /// Dispatch the committed line and report the result
    fn execute(&mut self) {
        self.busy = true;

        let result = dispatch(self.commands, self.committed.as_bytes_mut(), &mut self.sink);
        rt_debug!(
            SHELL_LOG_STREAM,
            timestamp_us(),
            "{} -> {:?}",
            self.committed.as_str(),
            result
        );

        self.committed.clear();
        self.show_result(result);
    }

    /// Render a result code, show the prompt and leave the busy state
    pub fn show_result(&mut self, result: ShellResult) {
        if let Some(text) = result_text(&result) {
            self.puts(text);
        }
        self.show_prompt();
        self.busy = false;
    }

    /// Print the prompt
    pub fn show_prompt(&mut self) {
        let _ = put_byte(&mut self.sink, PROMPT);
    }

    fn bell(&mut self) {
        let _ = put_byte(&mut self.sink, BELL);
    }

    fn cursor_left(&mut self, n: usize) {
        if n > 0 {
            let _ = shell_printf!(&mut self.sink, "\x1B[%uD", n);
        }
    }

    #[inline]
    fn puts(&mut self, s: &str) {
        let _ = put_str(&mut self.sink, s);
    }

    /// Current line contents
    pub fn line(&self) -> &[u8] {
        self.line.as_bytes()
    }

    /// Cursor position within the line
    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    /// Line handed to the dispatcher, empty outside of a dispatch
    pub fn committed_line(&self) -> &[u8] {
        self.committed.as_bytes()
    }

    /// A handler is running
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark the shell busy. Enter is discarded while set.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Access the output sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Access the output sink, mutable
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
