// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Decode raw terminal input bytes into logical [`KeyEvent`]s.
//!
//! In raw mode the terminal delivers each keystroke as one or more bytes:
//! plain printable characters arrive as UTF-8 (1-4 bytes), while arrow keys
//! and friends arrive as multi-byte `ESC [` sequences. The decoder
//! accumulates bytes and resolves them using the `more` flag for `ESC`
//! disambiguation:
//!
//! - `more = true`: more bytes might be coming, wait before deciding.
//! - `more = false`: input is drained; an unfinished sequence will never
//!   complete, so it resolves to [`KeyEvent::Unknown`] instead of blocking
//!   forever on a stray `ESC`.
//!
//! This works because if [`read()`] fills the entire buffer, more data is
//! likely waiting; if it returns fewer bytes, we've drained all available
//! input.
//!
//! Decoding is stateless between complete key events: once an event is
//! emitted, none of its bytes influence the next one.
//!
//! [`read()`]: std::io::Read::read

use std::collections::VecDeque;

use smallvec::SmallVec;

pub const ASCII_ESC: u8 = 0x1B;
pub const ASCII_DEL: u8 = 0x7F;
pub const ASCII_BS: u8 = 0x08;
pub const CTRL_C: u8 = 0x03;
pub const CTRL_D: u8 = 0x04;
pub const CTRL_A: u8 = 0x01;
pub const CTRL_E: u8 = 0x05;
pub const CTRL_U: u8 = 0x15;

/// Longest `ESC [` sequence the decoder will wait on before giving up and
/// flushing the accumulated bytes as [`KeyEvent::Unknown`].
const MAX_ESCAPE_SEQ_LEN: usize = 8;

/// Inline storage for the bytes of an unrecognized key. Sized to
/// [`MAX_ESCAPE_SEQ_LEN`] so flushed sequences never spill to the heap.
pub type UnknownBytes = SmallVec<[u8; MAX_ESCAPE_SEQ_LEN]>;

/// One logical key press, produced and consumed within a single decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character, decoded from 1-4 UTF-8 bytes as one unit so
    /// that cursor arithmetic operates on characters, not byte offsets.
    Printable(char),
    /// CR or LF (raw mode delivers Enter as CR).
    Enter,
    /// DEL (7F) or BS (08). The Backspace key sends DEL on most terminals;
    /// DEC VT100 reserved BS for cursor-left and terminals inherited this.
    Backspace,
    /// `ESC [ 3 ~`.
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// `ESC [ H`, `ESC [ 1 ~` or Ctrl+A.
    Home,
    /// `ESC [ F`, `ESC [ 4 ~` or Ctrl+E.
    End,
    /// Ctrl+U: clear the whole line.
    ClearLine,
    /// Ctrl+C. Signal generation is off in raw mode, so this arrives as an
    /// ordinary byte.
    Interrupt,
    /// Ctrl+D. The buffer-emptiness policy lives in the session loop, not
    /// here; the decoder stays stateless.
    EndOfInput,
    /// Bytes that don't map to any supported key, including escape
    /// sequences that never completed.
    Unknown(UnknownBytes),
}

fn unknown(bytes: &[u8]) -> KeyEvent { KeyEvent::Unknown(SmallVec::from_slice(bytes)) }

/// Try to decode one key event from the front of `buf`.
///
/// Returns `Some((event, bytes_consumed))` when the leading bytes resolve,
/// or `None` when they form an incomplete prefix and `more` input may still
/// complete it. With `more == false` every non-empty prefix resolves (an
/// unfinished sequence degrades to [`KeyEvent::Unknown`]).
#[must_use]
pub fn try_parse_key_event(buf: &[u8], more: bool) -> Option<(KeyEvent, usize)> {
    let first = *buf.first()?;
    match first {
        b'\r' | b'\n' => Some((KeyEvent::Enter, 1)),
        ASCII_DEL | ASCII_BS => Some((KeyEvent::Backspace, 1)),
        CTRL_C => Some((KeyEvent::Interrupt, 1)),
        CTRL_D => Some((KeyEvent::EndOfInput, 1)),
        CTRL_U => Some((KeyEvent::ClearLine, 1)),
        CTRL_A => Some((KeyEvent::Home, 1)),
        CTRL_E => Some((KeyEvent::End, 1)),
        ASCII_ESC => parse_escape_sequence(buf, more),
        0x00..=0x1F => Some((unknown(&buf[..1]), 1)),
        _ => parse_printable(buf, more),
    }
}

/// Disambiguate a leading `ESC` byte: CSI sequence, Alt-modified byte, or a
/// bare `ESC` that nothing will ever complete.
fn parse_escape_sequence(buf: &[u8], more: bool) -> Option<(KeyEvent, usize)> {
    if buf.len() == 1 {
        return if more {
            None
        } else {
            Some((unknown(buf), 1))
        };
    }

    if buf[1] != b'[' {
        // Not CSI (e.g. Alt+key sends ESC followed by the key byte).
        return Some((unknown(&buf[..2]), 2));
    }

    if buf.len() == 2 {
        return if more {
            None
        } else {
            Some((unknown(buf), 2))
        };
    }

    match buf[2] {
        b'A' => Some((KeyEvent::ArrowUp, 3)),
        b'B' => Some((KeyEvent::ArrowDown, 3)),
        b'C' => Some((KeyEvent::ArrowRight, 3)),
        b'D' => Some((KeyEvent::ArrowLeft, 3)),
        b'H' => Some((KeyEvent::Home, 3)),
        b'F' => Some((KeyEvent::End, 3)),
        b'0'..=b'9' => parse_csi_numeric(buf, more),
        _ => Some((unknown(&buf[..3]), 3)),
    }
}

/// Parse CSI sequences with numeric parameters: `ESC [ digits… final`.
/// Only `n ~` forms are recognized; everything else completes as `Unknown`.
fn parse_csi_numeric(buf: &[u8], more: bool) -> Option<(KeyEvent, usize)> {
    for (idx, &byte) in buf.iter().enumerate().skip(2) {
        if idx >= MAX_ESCAPE_SEQ_LEN {
            // Bounded wait: nothing we recognize is this long. Flush the
            // first MAX_ESCAPE_SEQ_LEN bytes and let the rest re-parse.
            return Some((unknown(&buf[..idx]), idx));
        }
        match byte {
            b'0'..=b'9' | b';' => {}
            b'~' => {
                let key = match &buf[2..idx] {
                    b"3" => KeyEvent::Delete,
                    b"1" | b"7" => KeyEvent::Home,
                    b"4" | b"8" => KeyEvent::End,
                    _ => unknown(&buf[..=idx]),
                };
                return Some((key, idx + 1));
            }
            _ => return Some((unknown(&buf[..=idx]), idx + 1)),
        }
    }

    if more {
        None
    } else {
        Some((unknown(buf), buf.len()))
    }
}

/// Decode one printable character, assembling multi-byte UTF-8 sequences
/// into a single event.
fn parse_printable(buf: &[u8], more: bool) -> Option<(KeyEvent, usize)> {
    let Some(len) = utf8_sequence_length(buf[0]) else {
        // Continuation or reserved byte with no valid start byte before it:
        // drop it and resynchronize.
        return Some((unknown(&buf[..1]), 1));
    };

    if buf.len() < len {
        return if more {
            None
        } else {
            Some((unknown(buf), buf.len()))
        };
    }

    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Some((KeyEvent::Printable(ch), len)),
            None => Some((unknown(&buf[..len]), len)),
        },
        // Start byte promised continuation bytes that didn't arrive; drop
        // the start byte and resynchronize on the next one.
        Err(_) => Some((unknown(&buf[..1]), 1)),
    }
}

/// Expected length of a UTF-8 sequence from its first byte, per the leading
/// bit pattern (`0xxxxxxx` 1, `110xxxxx` 2, `1110xxxx` 3, `11110xxx` 4).
fn utf8_sequence_length(first_byte: u8) -> Option<usize> {
    match first_byte {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        // Continuation byte (10xxxxxx) or reserved (11111xxx).
        _ => None,
    }
}

/// Stateful decoder for terminal input bytes.
///
/// Accumulates bytes via [`Self::advance`] and yields complete
/// [`KeyEvent`]s through its [`Iterator`] impl, in FIFO order.
#[derive(Debug)]
pub struct KeyDecoder {
    /// Accumulator for the key event currently being decoded.
    buffer: Vec<u8>,

    /// Queue of decoded events ready to be consumed.
    pending: VecDeque<KeyEvent>,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        KeyDecoder {
            buffer: Vec::with_capacity(64),
            pending: VecDeque::with_capacity(16),
        }
    }
}

impl KeyDecoder {
    /// Process incoming bytes and decode them into events.
    /// - `bytes`: raw bytes read from the input device.
    /// - `more`: whether more data is likely available (the read filled its
    ///   buffer completely).
    pub fn advance(&mut self, bytes: &[u8], more: bool) {
        for (idx, byte) in bytes.iter().enumerate() {
            // Recompute `more` for each byte: true if more bytes remain in
            // this chunk, or if the original read filled its buffer.
            let more = idx + 1 < bytes.len() || more;

            self.buffer.push(*byte);

            // A flushed Unknown can leave a decodable remainder behind, so
            // drain until the accumulator stops resolving.
            while let Some((event, consumed)) =
                try_parse_key_event(&self.buffer, more)
            {
                self.pending.push_back(event);
                self.buffer.drain(..consumed);
                if self.buffer.is_empty() {
                    break;
                }
            }
        }
    }
}

impl Iterator for KeyDecoder {
    type Item = KeyEvent;

    fn next(&mut self) -> Option<Self::Item> { self.pending.pop_front() }
}




#[cfg(test)]
mod tests_iterator_impl {
    use super::*;

    #[test]
    fn iterator_drains_pending_queue() {
        let mut decoder = KeyDecoder::default();
        decoder.advance(b"xyz", false);

        let events: Vec<_> = (&mut decoder).collect();
        assert_eq!(events.len(), 3);

        // Second iteration returns empty - queue is drained.
        let events: Vec<_> = decoder.collect();
        assert_eq!(events.len(), 0);
    }

    #[test]
    fn mixed_text_and_sequences_across_chunks() {
        let mut decoder = KeyDecoder::default();

        // First chunk: 'a' and the start of an arrow sequence.
        decoder.advance(&[b'a', ASCII_ESC], true);
        let events: Vec<_> = (&mut decoder).collect();
        assert_eq!(events, vec![KeyEvent::Printable('a')]);

        // Second chunk: completes the arrow, adds 'b'.
        decoder.advance(b"[Ab", false);
        let events: Vec<_> = (&mut decoder).collect();
        assert_eq!(events, vec![KeyEvent::ArrowUp, KeyEvent::Printable('b')]);
    }
}
