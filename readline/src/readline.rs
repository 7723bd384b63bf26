// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The blocking `read_line` loop tying raw mode, decoding, editing, history
//! and rendering together.

use thiserror::Error;

use crate::{History, InputDevice, KeyDecoder, KeyEvent, LineBuffer, OutputDevice,
            RawModeGuard, Renderer};

/// Read-buffer size for each blocking read. A read that fills this buffer
/// completely signals the decoder that more input is likely pending (the
/// `more` flag), which is how split escape sequences are told apart from a
/// bare Esc press.
const READ_CHUNK_SIZE: usize = 256;

/// Terminal width assumed for mock devices, where there is no TTY to query.
const MOCK_TERM_WIDTH: u16 = 80;

/// Why a `read_line` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadlineEvent {
    /// The user pressed Enter. The line does not include the terminator
    /// and may be empty.
    Line(String),
    /// Ctrl-D on an empty line, or the input reached end of stream.
    Eof,
    /// Ctrl-C. The in-progress line is discarded.
    Interrupted,
}

/// Error returned from [`Readline::read_line`].
#[derive(Debug, Error)]
pub enum ReadlineError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw mode could not be enabled or restored, typically because there
    /// is no controlling terminal.
    #[error("terminal error: {0}")]
    Terminal(String),
}

/// What an applied key event asks the session loop to do next.
#[derive(Debug, PartialEq, Eq)]
enum EventOutcome {
    /// State changed; redraw the prompt and line.
    Redraw,
    /// Nothing changed; skip the redraw.
    Unchanged,
    /// Enter: submit the line.
    Submit,
    /// Ctrl-C: abandon the line.
    Interrupt,
    /// Ctrl-D on an empty line, or end of input stream.
    Eof,
}

/// A line editor bound to a pair of devices, holding the session history.
///
/// [`Self::read_line`] blocks until the user submits or terminates a line.
/// The terminal is in raw mode only for the duration of each call; between
/// calls (and after errors) it is back in its original state.
///
/// The key decoder lives here rather than inside `read_line` so that
/// type-ahead works: keys decoded after an Enter but before the next
/// `read_line` call are applied to the next line, not dropped.
#[allow(missing_debug_implementations)]
pub struct Readline {
    input_device: InputDevice,
    output_device: OutputDevice,
    history: History,
    decoder: KeyDecoder,
}

impl Default for Readline {
    fn default() -> Self {
        Self::new(InputDevice::new_stdin(), OutputDevice::new_stdout())
    }
}

impl Readline {
    #[must_use]
    pub fn new(input_device: InputDevice, output_device: OutputDevice) -> Self {
        Self {
            input_device,
            output_device,
            history: History::new(),
            decoder: KeyDecoder::default(),
        }
    }

    /// Record a submitted line in history. Left to the caller so that
    /// application-level rejects (e.g. blank input) never pollute recall.
    pub fn add_history_entry(&mut self, line: &str) { self.history.append(line); }

    pub fn set_max_history(&mut self, max_size: usize) {
        self.history.set_max_size(max_size);
    }

    /// Read one line interactively.
    ///
    /// Renders `prompt` (prefixed with the `color` SGR sequence, pass `""`
    /// for no color) and processes keystrokes until the user presses Enter,
    /// Ctrl-C, or Ctrl-D on an empty line. Arrow keys edit the line and
    /// browse history per the usual readline conventions.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Terminal`] when raw mode cannot be enabled, or
    /// [`ReadlineError::Io`] when reading input or writing output fails.
    /// The terminal is restored before either is returned.
    pub fn read_line(
        &mut self,
        prompt: &str,
        color: &str,
    ) -> Result<ReadlineEvent, ReadlineError> {
        let is_mock = self.input_device.is_mock || self.output_device.is_mock;
        let _raw_mode = RawModeGuard::enable(is_mock)?;

        let term_width = if is_mock {
            MOCK_TERM_WIDTH
        } else {
            crossterm::terminal::size()
                .map(|(width, _height)| width)
                .unwrap_or(MOCK_TERM_WIDTH)
        };

        let mut renderer = Renderer::new(prompt, color, term_width);
        let mut buffer = LineBuffer::new();
        self.history.reset_browse();

        renderer.render_and_flush(&mut *self.output_device.lock(), &buffer)?;

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            // Drain decoded events before reading: type-ahead from the
            // previous call may already be waiting.
            for event in self.decoder.by_ref() {
                match apply_event(event, &mut buffer, &mut self.history) {
                    EventOutcome::Unchanged => {}
                    EventOutcome::Redraw => {
                        renderer.render_and_flush(
                            &mut *self.output_device.lock(),
                            &buffer,
                        )?;
                    }
                    EventOutcome::Submit => {
                        renderer.finish_line_and_flush(
                            &mut *self.output_device.lock(),
                            &buffer,
                        )?;
                        return Ok(ReadlineEvent::Line(buffer.take()));
                    }
                    EventOutcome::Interrupt => {
                        renderer.erase_and_flush(&mut *self.output_device.lock())?;
                        return Ok(ReadlineEvent::Interrupted);
                    }
                    EventOutcome::Eof => {
                        renderer.erase_and_flush(&mut *self.output_device.lock())?;
                        return Ok(ReadlineEvent::Eof);
                    }
                }
            }

            let n = self.input_device.read(&mut chunk)?;
            if n == 0 {
                // Input stream ended mid-line. Same exit as Ctrl-D.
                renderer.erase_and_flush(&mut *self.output_device.lock())?;
                return Ok(ReadlineEvent::Eof);
            }

            let more = n == chunk.len();
            self.decoder.advance(&chunk[..n], more);
        }
    }
}

/// Apply one key event to the line and the history browse cursor.
fn apply_event(
    event: KeyEvent,
    buffer: &mut LineBuffer,
    history: &mut History,
) -> EventOutcome {
    match event {
        KeyEvent::Printable(ch) => {
            buffer.insert(ch);
            EventOutcome::Redraw
        }
        KeyEvent::Enter => EventOutcome::Submit,
        KeyEvent::Backspace => redraw_if(buffer.delete_before_cursor()),
        KeyEvent::Delete => redraw_if(buffer.delete_at_cursor()),
        KeyEvent::ArrowLeft => redraw_if(buffer.move_cursor(-1)),
        KeyEvent::ArrowRight => redraw_if(buffer.move_cursor(1)),
        KeyEvent::Home => redraw_if(buffer.move_cursor_to_start()),
        KeyEvent::End => redraw_if(buffer.move_cursor_to_end()),
        KeyEvent::ClearLine => {
            let had_contents = !buffer.is_empty() || buffer.cursor() != 0;
            buffer.clear();
            redraw_if(had_contents)
        }
        KeyEvent::ArrowUp => match history.browse_older(buffer.contents()) {
            Some(entry) => {
                buffer.set_contents(&entry);
                EventOutcome::Redraw
            }
            None => EventOutcome::Unchanged,
        },
        KeyEvent::ArrowDown => match history.browse_newer() {
            Some(entry) => {
                buffer.set_contents(&entry);
                EventOutcome::Redraw
            }
            None => EventOutcome::Unchanged,
        },
        KeyEvent::Interrupt => EventOutcome::Interrupt,
        KeyEvent::EndOfInput => {
            // Only terminates on an empty line; otherwise ignored, matching
            // the terminal driver's VEOF behavior in cooked mode.
            if buffer.is_empty() {
                EventOutcome::Eof
            } else {
                EventOutcome::Unchanged
            }
        }
        KeyEvent::Unknown(bytes) => {
            tracing::debug!(?bytes, "ignoring unrecognized key input");
            EventOutcome::Unchanged
        }
    }
}

fn redraw_if(changed: bool) -> EventOutcome {
    if changed {
        EventOutcome::Redraw
    } else {
        EventOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests_apply_event {
    use pretty_assertions::assert_eq;
    use smallvec::SmallVec;

    use super::*;

    #[test]
    fn printable_inserts_and_redraws() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();

        let outcome =
            apply_event(KeyEvent::Printable('x'), &mut buffer, &mut history);

        assert_eq!(outcome, EventOutcome::Redraw);
        assert_eq!(buffer.contents(), "x");
    }

    #[test]
    fn backspace_on_empty_line_skips_redraw() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();

        let outcome = apply_event(KeyEvent::Backspace, &mut buffer, &mut history);
        assert_eq!(outcome, EventOutcome::Unchanged);
    }

    #[test]
    fn ctrl_d_on_empty_line_is_eof() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();

        let outcome = apply_event(KeyEvent::EndOfInput, &mut buffer, &mut history);
        assert_eq!(outcome, EventOutcome::Eof);
    }

    #[test]
    fn ctrl_d_on_nonempty_line_is_ignored() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();
        buffer.insert('a');

        let outcome = apply_event(KeyEvent::EndOfInput, &mut buffer, &mut history);

        assert_eq!(outcome, EventOutcome::Unchanged);
        assert_eq!(buffer.contents(), "a");
    }

    #[test]
    fn arrow_up_recalls_and_stashes_the_live_line() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();
        history.append("older");
        buffer.insert('d');

        let outcome = apply_event(KeyEvent::ArrowUp, &mut buffer, &mut history);
        assert_eq!(outcome, EventOutcome::Redraw);
        assert_eq!(buffer.contents(), "older");

        let outcome = apply_event(KeyEvent::ArrowDown, &mut buffer, &mut history);
        assert_eq!(outcome, EventOutcome::Redraw);
        assert_eq!(buffer.contents(), "d");
    }

    #[test]
    fn arrow_up_on_empty_history_is_noop() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();

        let outcome = apply_event(KeyEvent::ArrowUp, &mut buffer, &mut history);
        assert_eq!(outcome, EventOutcome::Unchanged);
    }

    #[test]
    fn clear_line_wipes_the_buffer() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();
        buffer.insert('a');
        buffer.insert('b');

        let outcome = apply_event(KeyEvent::ClearLine, &mut buffer, &mut history);

        assert_eq!(outcome, EventOutcome::Redraw);
        assert!(buffer.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut buffer = LineBuffer::new();
        let mut history = History::new();

        let outcome = apply_event(
            KeyEvent::Unknown(SmallVec::from_slice(b"\x1b[5~")),
            &mut buffer,
            &mut history,
        );
        assert_eq!(outcome, EventOutcome::Unchanged);
    }
}

#[cfg(test)]
mod tests_read_line {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_fixtures::output_device_mock_pair;

    fn readline_with_input(bytes: &[u8]) -> Readline {
        let (output_device, _mock) = output_device_mock_pair();
        Readline::new(InputDevice::new_mock(bytes.to_vec()), output_device)
    }

    #[test]
    fn typed_line_is_returned_on_enter() {
        let mut readline = readline_with_input(b"hello\r");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line("hello".into()));
    }

    #[test]
    fn empty_enter_returns_empty_line() {
        let mut readline = readline_with_input(b"\r");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line(String::new()));
    }

    #[test]
    fn backspace_edits_before_submit() {
        let mut readline = readline_with_input(b"abx\x7Fc\r");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line("abc".into()));
    }

    #[test]
    fn ctrl_c_interrupts() {
        let mut readline = readline_with_input(b"partial\x03");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Interrupted);
    }

    #[test]
    fn ctrl_d_on_empty_line_is_eof() {
        let mut readline = readline_with_input(b"\x04");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Eof);
    }

    #[test]
    fn ctrl_d_mid_line_is_ignored() {
        let mut readline = readline_with_input(b"a\x04b\r");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line("ab".into()));
    }

    #[test]
    fn exhausted_input_is_eof() {
        let mut readline = readline_with_input(b"");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Eof);
    }

    #[test]
    fn arrow_up_submits_a_history_entry() {
        let mut readline = readline_with_input(b"\x1b[A\r");
        readline.add_history_entry("previous command");

        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line("previous command".into()));
    }

    #[test]
    fn cursor_movement_inserts_mid_line() {
        // Type "ac", move left once, insert "b".
        let mut readline = readline_with_input(b"ac\x1b[Db\r");
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line("abc".into()));
    }

    #[test]
    fn utf8_input_round_trips() {
        let mut readline = readline_with_input("héllo 中😀\r".as_bytes());
        let event = readline.read_line("> ", "").unwrap();
        assert_eq!(event, ReadlineEvent::Line("héllo 中😀".into()));
    }
}
