//! Line editor tests: echo, redraw sequences and control keys

use vt100_shell::shell::{CommandDescriptor, Shell, ShellResult};
use vt100_shell::sink::Sink;

const LEFT: &[u8] = b"\x1B[D";
const RIGHT: &[u8] = b"\x1B[C";
const HOME: &[u8] = b"\x1B[1~";
const END: &[u8] = b"\x1B[4~";
const DELETE: &[u8] = b"\x1B[3~";

fn ok(_args: &str, _out: &mut dyn Sink) -> ShellResult {
    Ok(())
}

static TABLE: &[CommandDescriptor] = &[CommandDescriptor { name: "GO", brief: "", handler: &ok }];

fn shell() -> Shell<'static, TestOutput> {
    Shell::new(TestOutput::new(), TABLE)
}

fn feed<S: Sink, const N: usize>(shell: &mut Shell<'_, S, N>, bytes: &[u8]) {
    for &b in bytes {
        shell.process_byte(b);
    }
}

#[test]
fn test_start_prints_banner_and_prompt() {
    let mut sh = shell();
    sh.start();

    assert_eq!(sh.sink_mut().take(), b"\r\n\r\nWelcome to ESP32 shell\r\n>");
}

#[test]
fn test_typing_at_tail_echoes() {
    let mut sh = shell();
    feed(&mut sh, b"hello");

    assert_eq!(sh.line(), b"hello");
    assert_eq!(sh.cursor(), 5);
    assert_eq!(sh.sink_mut().take(), b"hello");
}

#[test]
fn test_insert_mid_line_redraws_tail() {
    let mut sh = shell();
    feed(&mut sh, b"abc");
    feed(&mut sh, LEFT);
    feed(&mut sh, LEFT);
    sh.sink_mut().take();

    feed(&mut sh, b"X");

    assert_eq!(sh.line(), b"aXbc");
    assert_eq!(sh.cursor(), 2);
    assert_eq!(sh.sink_mut().take(), b"Xbc\x1B[2D");
}

#[test]
fn test_insert_before_last_byte() {
    let mut sh = shell();
    feed(&mut sh, b"ab");
    feed(&mut sh, LEFT);
    sh.sink_mut().take();

    feed(&mut sh, b"_");

    assert_eq!(sh.line(), b"a_b");
    assert_eq!(sh.sink_mut().take(), b"_b\x1B[1D");
}

#[test]
fn test_backspace_at_tail() {
    let mut sh = shell();
    feed(&mut sh, b"ab");
    sh.sink_mut().take();

    feed(&mut sh, b"\x08");

    assert_eq!(sh.line(), b"a");
    assert_eq!(sh.sink_mut().take(), b"\x08 \x08");
}

#[test]
fn test_backspace_mid_line() {
    let mut sh = shell();
    feed(&mut sh, b"abcd");
    feed(&mut sh, LEFT);
    feed(&mut sh, LEFT);
    sh.sink_mut().take();

    feed(&mut sh, b"\x08");

    assert_eq!(sh.line(), b"acd");
    assert_eq!(sh.cursor(), 1);
    assert_eq!(sh.sink_mut().take(), b"\x1B[Dcd \x1B[3D");
}

#[test]
fn test_backspace_at_start_is_silent() {
    let mut sh = shell();
    feed(&mut sh, b"ab");
    feed(&mut sh, HOME);
    sh.sink_mut().take();

    feed(&mut sh, b"\x08");

    assert_eq!(sh.line(), b"ab");
    assert!(sh.sink_mut().take().is_empty());
}

#[test]
fn test_delete_under_cursor() {
    let mut sh = shell();
    feed(&mut sh, b"abcd");
    feed(&mut sh, HOME);
    feed(&mut sh, RIGHT);
    sh.sink_mut().take();

    feed(&mut sh, DELETE);

    assert_eq!(sh.line(), b"acd");
    assert_eq!(sh.cursor(), 1);
    assert_eq!(sh.sink_mut().take(), b"cd \x1B[3D");
}

#[test]
fn test_delete_last_byte() {
    let mut sh = shell();
    feed(&mut sh, b"ab");
    feed(&mut sh, LEFT);
    sh.sink_mut().take();

    // Ctrl-D deletes too
    feed(&mut sh, b"\x04");

    assert_eq!(sh.line(), b"a");
    assert_eq!(sh.sink_mut().take(), b" \x1B[1D");
}

#[test]
fn test_delete_at_tail_is_silent() {
    let mut sh = shell();
    feed(&mut sh, b"ab");
    sh.sink_mut().take();

    feed(&mut sh, b"\x7F");

    assert_eq!(sh.line(), b"ab");
    assert!(sh.sink_mut().take().is_empty());
}

#[test]
fn test_home_and_end() {
    let mut sh = shell();
    feed(&mut sh, b"abc");
    sh.sink_mut().take();

    feed(&mut sh, HOME);
    assert_eq!(sh.cursor(), 0);
    assert_eq!(sh.sink_mut().take(), b"\x1B[3D");

    // Ctrl-E
    feed(&mut sh, b"\x05");
    assert_eq!(sh.cursor(), 3);
    assert_eq!(sh.sink_mut().take(), b"\x1B[3C");
}

#[test]
fn test_home_end_at_limits_are_silent() {
    let mut sh = shell();
    feed(&mut sh, END);
    feed(&mut sh, HOME);
    feed(&mut sh, b"ab");
    sh.sink_mut().take();

    feed(&mut sh, END);
    feed(&mut sh, b"\x01");
    feed(&mut sh, HOME);

    assert_eq!(sh.sink_mut().take(), b"\x1B[2D");
}

#[test]
fn test_arrows_stop_at_limits() {
    let mut sh = shell();
    feed(&mut sh, b"a");
    sh.sink_mut().take();

    feed(&mut sh, RIGHT);
    assert!(sh.sink_mut().take().is_empty());

    feed(&mut sh, LEFT);
    feed(&mut sh, LEFT);
    feed(&mut sh, b"\x02");
    assert_eq!(sh.cursor(), 0);
    assert_eq!(sh.sink_mut().take(), LEFT);

    // Ctrl-F
    feed(&mut sh, b"\x06");
    assert_eq!(sh.cursor(), 1);
    assert_eq!(sh.sink_mut().take(), RIGHT);
}

#[test]
fn test_overflow_rings_bell() {
    let mut sh: Shell<'_, TestOutput, 4> = Shell::new(TestOutput::new(), TABLE);
    feed(&mut sh, b"abcd");
    sh.sink_mut().take();

    feed(&mut sh, b"e");

    assert_eq!(sh.line(), b"abcd");
    assert_eq!(sh.sink_mut().take(), b"\x07");
}

#[test]
fn test_default_capacity_holds_full_line() {
    let mut sh = shell();
    let long = [b'x'; 63];
    feed(&mut sh, &long);
    sh.sink_mut().take();

    feed(&mut sh, b"y");

    assert_eq!(sh.line().len(), 63);
    assert_eq!(sh.sink_mut().take(), b"\x07");
}

#[test]
fn test_unhandled_keys_ring_bell() {
    let mut sh = shell();

    feed(&mut sh, b"\t");
    feed(&mut sh, b"\x1B[A");
    feed(&mut sh, b"\x1B[B");

    assert!(sh.line().is_empty());
    assert_eq!(sh.sink_mut().take(), b"\x07\x07\x07");
}

#[test]
fn test_unknown_escape_is_silent() {
    let mut sh = shell();
    feed(&mut sh, b"\x1B[Z");

    assert!(sh.sink_mut().take().is_empty());
}

#[test]
fn test_ctrl_c_discards_line() {
    let mut sh = shell();
    feed(&mut sh, b"ab");
    sh.sink_mut().take();

    feed(&mut sh, b"\x03");

    assert!(sh.line().is_empty());
    assert_eq!(sh.cursor(), 0);
    assert_eq!(sh.sink_mut().take(), b"^C\r\n>");
}

#[test]
fn test_empty_enter_reprompts() {
    let mut sh = shell();

    feed(&mut sh, b"\r");
    feed(&mut sh, b"\n");
    feed(&mut sh, b"\r");

    // The LF after CR is swallowed, the second CR is a fresh empty line
    assert_eq!(sh.sink_mut().take(), b"\r\n>\r\n>");
}

#[test]
fn test_bare_lf_terminates_line() {
    let mut sh = shell();
    feed(&mut sh, b"go\n");

    assert_eq!(sh.sink_mut().take(), b"go\r\nOK\r\n>");
}

#[test]
fn test_crlf_runs_once() {
    let mut sh = shell();
    feed(&mut sh, b"go\r\n");

    assert_eq!(sh.sink_mut().take(), b"go\r\nOK\r\n>");
    assert!(sh.line().is_empty());
}

#[test]
fn test_lf_after_cr_keeps_typed_text() {
    let mut sh = shell();
    feed(&mut sh, b"\rgo\n");

    assert_eq!(sh.sink_mut().take(), b"\r\n>go\r\nOK\r\n>");
}

#[test]
fn test_enter_mid_line_commits_whole_line() {
    let mut sh = shell();
    feed(&mut sh, b"go");
    feed(&mut sh, HOME);
    sh.sink_mut().take();

    feed(&mut sh, b"\r");

    assert_eq!(sh.sink_mut().take(), b"\r\nOK\r\n>");
}

// Test output buffer
struct TestOutput {
    bytes: Vec<u8>,
}

impl TestOutput {
    fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }
}

impl Sink for TestOutput {
    fn emit(&mut self, byte: u8) -> i32 {
        self.bytes.push(byte);
        1
    }
}
