//! Receive queue tests

use vt100_shell::input::InputQueue;
use vt100_shell::shell::{CommandDescriptor, Shell};
use vt100_shell::sink::Sink;

#[test]
fn test_queue_preserves_order() {
    let queue = InputQueue::<8>::new();

    for &b in b"help\r" {
        assert!(queue.push(b));
    }
    assert_eq!(queue.pending(), 5);

    let drained: Vec<u8> = std::iter::from_fn(|| queue.pop()).collect();
    assert_eq!(drained, b"help\r");
    assert!(queue.is_empty());
}

#[test]
fn test_full_queue_drops_and_counts() {
    let queue = InputQueue::<4>::new();

    for b in 0..4u8 {
        assert!(queue.push(b));
    }
    assert!(!queue.push(4));
    assert!(!queue.push(5));
    assert_eq!(queue.dropped(), 2);

    // Older bytes are kept, not overwritten
    assert_eq!(queue.pop(), Some(0));
    assert!(queue.push(6));
    let rest: Vec<u8> = std::iter::from_fn(|| queue.pop()).collect();
    assert_eq!(rest, [1, 2, 3, 6]);

    queue.reset_dropped();
    assert_eq!(queue.dropped(), 0);
}

#[test]
fn test_pop_empty() {
    let queue = InputQueue::<2>::new();
    assert_eq!(queue.pop(), None);
    assert_eq!(queue.pending(), 0);
}

#[test]
fn test_queue_feeds_shell() {
    let queue = InputQueue::<16>::new();
    let table: [CommandDescriptor; 0] = [];
    let mut shell: Shell<'_, Discard> = Shell::new(Discard, &table);

    for &b in b"ab\x1B[D\x08" {
        queue.push(b);
    }
    while let Some(b) = queue.pop() {
        shell.process_byte(b);
    }

    assert_eq!(shell.line(), b"b");
    assert_eq!(shell.cursor(), 0);
}

// Drops all output
struct Discard;

impl Sink for Discard {
    fn emit(&mut self, _byte: u8) -> i32 {
        1
    }
}
