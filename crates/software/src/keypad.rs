//! Decodes the keypad's navigation keys.
//!
//! The keypad behaves like a terminal: each key arrives as a three-byte ANSI escape sequence (`ESC [ A` for up, and
//! so on). Bytes arrive one at a time, so [`EscapeSequence`] accumulates them and hands back complete sequences.

use tinyvec::ArrayVec;

/// Bytes every sequence starts with: escape, then an opening bracket.
const PREFIX: [u8; 2] = [0x1B, b'['];

/// Length of a complete key sequence.
pub const SEQUENCE_LEN: usize = 3;

/// The four navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Moves to the previous screen, or lowers a value while editing.
    Left,
    /// Starts editing, or activates an action.
    Down,
    /// Stops editing, or deactivates an action.
    Up,
    /// Moves to the next screen, or raises a value while editing.
    Right,
}

impl Key {
    /// Maps a complete escape sequence to its key. Any other sequence is not a key.
    pub fn from_sequence(sequence: &[u8]) -> Option<Self> {
        match sequence {
            [0x1B, b'[', b'A'] => Some(Self::Up),
            [0x1B, b'[', b'B'] => Some(Self::Down),
            [0x1B, b'[', b'C'] => Some(Self::Right),
            [0x1B, b'[', b'D'] => Some(Self::Left),
            _ => None,
        }
    }
}

/// Accumulates keypad bytes into complete three-byte sequences.
#[derive(Debug, Default)]
pub struct EscapeSequence {
    bytes: ArrayVec<[u8; SEQUENCE_LEN]>,
}

impl EscapeSequence {
    /// Construct an empty `EscapeSequence`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one byte, returning the sequence once three bytes have been collected.
    ///
    /// As soon as the bytes received so far can no longer begin with `ESC [`, they are thrown away, the offending
    /// byte included. Only the prefix is checked; whether the third byte names a key is up to [`Key::from_sequence`].
    pub fn push(&mut self, byte: u8) -> Option<[u8; SEQUENCE_LEN]> {
        self.bytes.push(byte);

        let checked = self.bytes.len().min(PREFIX.len());
        if self.bytes[..checked] != PREFIX[..checked] {
            self.bytes.clear();
            return None;
        }

        if self.bytes.len() == SEQUENCE_LEN {
            let sequence = [self.bytes[0], self.bytes[1], self.bytes[2]];
            self.bytes.clear();
            Some(sequence)
        } else {
            None
        }
    }

    /// Forgets a partially received sequence.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Returns `true` if no partial sequence is pending.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(sequence: &mut EscapeSequence, bytes: &[u8]) -> Vec<[u8; SEQUENCE_LEN]> {
        bytes.iter().filter_map(|&b| sequence.push(b)).collect()
    }

    #[test]
    fn arrow_keys() {
        assert_eq!(Some(Key::Up), Key::from_sequence(b"\x1b[A"));
        assert_eq!(Some(Key::Down), Key::from_sequence(b"\x1b[B"));
        assert_eq!(Some(Key::Right), Key::from_sequence(b"\x1b[C"));
        assert_eq!(Some(Key::Left), Key::from_sequence(b"\x1b[D"));
        assert_eq!(None, Key::from_sequence(b"\x1b[E"));
        assert_eq!(None, Key::from_sequence(b"\x1b["));
    }

    #[test]
    fn collects_consecutive_sequences() {
        let mut sequence = EscapeSequence::new();
        assert_eq!(
            vec![*b"\x1b[A", *b"\x1b[D"],
            feed(&mut sequence, b"\x1b[A\x1b[D"),
            "Expected left but got right"
        );
        assert!(sequence.is_empty());
    }

    #[test]
    fn discards_bytes_outside_a_sequence() {
        let mut sequence = EscapeSequence::new();
        assert_eq!(
            vec![*b"\x1b[B"],
            feed(&mut sequence, b"xy\x1b[B"),
            "Expected stray bytes to be dropped"
        );
    }

    #[test]
    fn discards_broken_prefix() {
        let mut sequence = EscapeSequence::new();
        // the second byte breaks the prefix, so both bytes go; the sequence that follows is intact
        assert_eq!(vec![*b"\x1b[C"], feed(&mut sequence, b"\x1bO\x1b[C"));
    }

    #[test]
    fn keeps_unknown_final_byte() {
        let mut sequence = EscapeSequence::new();
        assert_eq!(
            vec![*b"\x1b[Z"],
            feed(&mut sequence, b"\x1b[Z"),
            "Only the prefix decides whether bytes are discarded"
        );
    }

    #[test]
    fn clear_drops_partial_sequence() {
        let mut sequence = EscapeSequence::new();
        assert!(feed(&mut sequence, b"\x1b[").is_empty());
        assert!(!sequence.is_empty());

        sequence.clear();
        assert!(sequence.is_empty());
        assert!(
            feed(&mut sequence, b"A").is_empty(),
            "A lone final byte should not complete a sequence"
        );
    }
}
