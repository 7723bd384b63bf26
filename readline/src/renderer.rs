// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Redraws the prompt and the in-progress line after every edit.
//!
//! The strategy is overwrite-in-place: move the terminal cursor back to
//! where the prompt starts, clear from there downward, write the prompt and
//! the current line contents, then park the cursor at its logical position
//! within the line. All positioning accounts for soft wrapping: a line
//! wider than the terminal occupies `width / term_width + 1` rows, and
//! "back to the start" means moving up that many rows, not just to column
//! zero.

use std::io::{self, Write};

use crossterm::{QueueableCommand,
                cursor,
                style::ResetColor,
                terminal::{Clear, ClearType::FromCursorDown}};
use unicode_width::UnicodeWidthStr;

use crate::LineBuffer;

/// Display width of `text` in terminal columns, ignoring any embedded ANSI
/// escape sequences.
fn display_width_strip_ansi(text: &str) -> u16 {
    let stripped = strip_ansi_escapes::strip(text.as_bytes());
    let stripped = String::from_utf8_lossy(&stripped);
    u16::try_from(stripped.width()).unwrap_or(u16::MAX)
}

fn width_u16(columns: usize) -> u16 { u16::try_from(columns).unwrap_or(u16::MAX) }

/// Renders one prompt + line onto the terminal, tracking where the terminal
/// cursor currently sits so the next redraw can overwrite in place.
#[derive(Debug)]
pub struct Renderer {
    prompt: String,

    /// SGR prefix applied to the line contents, e.g. `"\x1b[36m"` for
    /// cyan. Reset after the contents so later output renders in the
    /// default color.
    color: String,

    /// Display width of the prompt, ANSI stripped.
    prompt_width: u16,

    term_width: u16,

    /// Column the terminal cursor sits at, counted from the start of the
    /// prompt (so it can exceed `term_width` when the line wraps).
    current_column: u16,
}

impl Renderer {
    #[must_use]
    pub fn new(prompt: &str, color: &str, term_width: u16) -> Self {
        let prompt_width = display_width_strip_ansi(prompt);
        Self {
            prompt: prompt.to_owned(),
            color: color.to_owned(),
            prompt_width,
            // Guard the wrap arithmetic against a zero-width terminal.
            term_width: term_width.max(1),
            current_column: prompt_width,
        }
    }

    /// Number of rows the cursor is below the prompt's row when sitting at
    /// column `pos`.
    fn line_height(&self, pos: u16) -> u16 { pos / self.term_width }

    /// Move from column `from` to the start of the prompt's row.
    fn move_to_beginning(&self, term: &mut dyn Write, from: u16) -> io::Result<()> {
        let move_up = self.line_height(from.saturating_sub(1));
        term.queue(cursor::MoveToColumn(0))?;
        if move_up != 0 {
            term.queue(cursor::MoveUp(move_up))?;
        }
        Ok(())
    }

    /// Move from the start of the prompt's row to column `to`.
    fn move_from_beginning(&self, term: &mut dyn Write, to: u16) -> io::Result<()> {
        let move_down = self.line_height(to.saturating_sub(1));
        let remaining = to % self.term_width;
        if move_down != 0 {
            term.queue(cursor::MoveDown(move_down))?;
        }
        if remaining != 0 {
            term.queue(cursor::MoveRight(remaining))?;
        }
        Ok(())
    }

    /// Erase the prompt and line from the screen, leaving the cursor at the
    /// start of the prompt's row.
    fn clear(&self, term: &mut dyn Write) -> io::Result<()> {
        self.move_to_beginning(term, self.current_column)?;
        term.queue(Clear(FromCursorDown))?;
        Ok(())
    }

    /// Redraw the prompt and `buffer`, leaving the terminal cursor at the
    /// buffer's cursor position.
    pub fn render_and_flush(
        &mut self,
        term: &mut dyn Write,
        buffer: &LineBuffer,
    ) -> io::Result<()> {
        self.clear(term)?;

        write!(term, "{}", self.prompt)?;
        write!(term, "{}{}", self.color, buffer.contents())?;
        term.queue(ResetColor)?;

        // Writing left the terminal cursor at the end of the line; walk it
        // back to the buffer's cursor position.
        let end_column = self.prompt_width + width_u16(buffer.display_width());
        self.current_column =
            self.prompt_width + width_u16(buffer.display_width_before_cursor());
        self.move_to_beginning(term, end_column)?;
        self.move_from_beginning(term, self.current_column)?;

        term.flush()
    }

    /// Finish the line on Enter: leave the submitted text visible, move to
    /// the next row, and reset for the next prompt.
    pub fn finish_line_and_flush(
        &mut self,
        term: &mut dyn Write,
        buffer: &LineBuffer,
    ) -> io::Result<()> {
        // Jump from the cursor position to the end of the line first, so
        // the newline lands after the text.
        let end_column = self.prompt_width + width_u16(buffer.display_width());
        self.move_to_beginning(term, self.current_column)?;
        self.move_from_beginning(term, end_column)?;

        write!(term, "\r\n")?;
        self.current_column = self.prompt_width;
        term.flush()
    }

    /// Erase the prompt and line on Ctrl-C / Ctrl-D, leaving the cursor at
    /// the start of the row.
    pub fn erase_and_flush(&mut self, term: &mut dyn Write) -> io::Result<()> {
        self.clear(term)?;
        self.current_column = self.prompt_width;
        term.flush()
    }
}
