//! VT100 escape sequence decoder.
//!
//! Folds the multi-byte sequences sent by cursor keys into the single
//! control codes the line editor understands:
//!
//! ```text
//! ESC [ D   ──▶ 0x02  left     ESC [ 1 ~ ──▶ 0x01  home
//! ESC [ C   ──▶ 0x06  right    ESC [ 3 ~ ──▶ 0x7F  delete
//! ESC [ A   ──▶ 0x10  up       ESC [ 4 ~ ──▶ 0x05  end
//! ESC [ B   ──▶ 0x0E  down
//! ```
//!
//! Unknown sequences are swallowed and the decoder falls back to `Normal`.

/// Escape (0x1B)
pub const ESC: u8 = 0x1B;

/// Ctrl-A, also produced by the home key
pub const KEY_HOME: u8 = 0x01;
/// Ctrl-B, also produced by the left arrow
pub const KEY_LEFT: u8 = 0x02;
/// Ctrl-C
pub const KEY_INTERRUPT: u8 = 0x03;
/// Ctrl-D
pub const KEY_EOT: u8 = 0x04;
/// Ctrl-E, also produced by the end key
pub const KEY_END: u8 = 0x05;
/// Ctrl-F, also produced by the right arrow
pub const KEY_RIGHT: u8 = 0x06;
/// Ctrl-H
pub const KEY_BACKSPACE: u8 = 0x08;
/// Ctrl-N, also produced by the down arrow
pub const KEY_DOWN: u8 = 0x0E;
/// Ctrl-P, also produced by the up arrow
pub const KEY_UP: u8 = 0x10;
/// DEL, also produced by the delete key
pub const KEY_DELETE: u8 = 0x7F;

/// Decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    Normal,
    /// Got ESC
    Esc,
    /// Got ESC [
    Bracket,
    /// Got ESC [ 1
    Bracket1,
    /// Got ESC [ 3
    Bracket3,
    /// Got ESC [ 4
    Bracket4,
}

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A complete key-press for the line editor.
    Resolved(u8),
    /// Byte absorbed (sequence in progress or discarded).
    Pending,
}

impl EscapeState {
    /// Transition function.
    pub fn next(self, byte: u8) -> (EscapeState, Decoded) {
        use EscapeState::*;

        match (self, byte) {
            (Normal, ESC) => (Esc, Decoded::Pending),
            (Normal, b) => (Normal, Decoded::Resolved(b)),

            (Esc, b'[') => (Bracket, Decoded::Pending),

            (Bracket, b'D') => (Normal, Decoded::Resolved(KEY_LEFT)),
            (Bracket, b'C') => (Normal, Decoded::Resolved(KEY_RIGHT)),
            (Bracket, b'A') => (Normal, Decoded::Resolved(KEY_UP)),
            (Bracket, b'B') => (Normal, Decoded::Resolved(KEY_DOWN)),
            (Bracket, b'1') => (Bracket1, Decoded::Pending),
            (Bracket, b'3') => (Bracket3, Decoded::Pending),
            (Bracket, b'4') => (Bracket4, Decoded::Pending),

            (Bracket1, b'~') => (Normal, Decoded::Resolved(KEY_HOME)),
            (Bracket3, b'~') => (Normal, Decoded::Resolved(KEY_DELETE)),
            (Bracket4, b'~') => (Normal, Decoded::Resolved(KEY_END)),

            // Unknown sequence
            _ => (Normal, Decoded::Pending),
        }
    }
}

/// Stateful decoder, one per input stream.
#[derive(Debug, Clone)]
pub struct EscapeDecoder {
    state: EscapeState,
}

impl EscapeDecoder {
    /// Create decoder in `Normal` state
    pub const fn new() -> Self {
        Self {
            state: EscapeState::Normal,
        }
    }

    /// Feed one raw byte.
    #[inline]
    pub fn feed(&mut self, byte: u8) -> Decoded {
        let (state, out) = self.state.next(byte);
        self.state = state;
        out
    }

    /// Current state
    pub fn state(&self) -> EscapeState {
        self.state
    }

    /// Drop any partial sequence
    pub fn reset(&mut self) {
        self.state = EscapeState::Normal;
    }
}

impl Default for EscapeDecoder {
    fn default() -> Self {
        Self::new()
    }
}
