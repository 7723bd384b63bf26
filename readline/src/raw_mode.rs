// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw-mode control for the terminal, using rustix's safe termios API.
//!
//! Cooked (canonical) mode buffers input by line and echoes it, which makes
//! per-keystroke editing impossible. [`RawModeGuard::enable`] switches the
//! terminal to raw mode and snapshots the previous settings; dropping the
//! guard restores them. Because restoration lives in [`Drop`], every exit
//! path out of a `read_line` call puts the terminal back, including `?`
//! early returns.

use std::{fs::File, io};

use rustix::{fd::{AsFd, BorrowedFd},
             termios::{self, OptionalActions, Termios}};

use crate::ReadlineError;

/// The controlling terminal: stdin when it is a tty, `/dev/tty` otherwise
/// (stdin may be redirected, e.g. `echo data | app`). Same selection logic
/// crossterm uses.
enum TerminalFd {
    Stdin(io::Stdin),
    DevTty(File),
}

impl AsFd for TerminalFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            TerminalFd::Stdin(stdin) => stdin.as_fd(),
            TerminalFd::DevTty(file) => file.as_fd(),
        }
    }
}

fn get_terminal_fd() -> Result<TerminalFd, ReadlineError> {
    let stdin = io::stdin();
    if termios::isatty(&stdin) {
        Ok(TerminalFd::Stdin(stdin))
    } else {
        let file = File::options()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(|e| {
                ReadlineError::Terminal(format!(
                    "stdin is not a terminal and /dev/tty could not be opened: {e}"
                ))
            })?;
        Ok(TerminalFd::DevTty(file))
    }
}

/// RAII guard for raw mode. Holds the terminal fd and the settings snapshot
/// taken before raw mode was enabled; [`Drop`] writes the snapshot back.
///
/// For mock devices the guard is inert: no termios calls are made in either
/// direction, so tests run without a TTY.
#[allow(missing_debug_implementations)]
pub struct RawModeGuard {
    /// `None` for mock devices.
    saved: Option<(TerminalFd, Termios)>,
}

impl RawModeGuard {
    /// Switch the terminal into raw mode.
    ///
    /// `make_raw()` disables canonical mode, echo, and signal generation,
    /// and sets `VMIN=1, VTIME=0` so reads block until at least one byte is
    /// available. The same cfmakeraw behavior crossterm applies.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Terminal`] when no controlling terminal can be
    /// found or its attributes cannot be read or changed.
    pub fn enable(is_mock: bool) -> Result<Self, ReadlineError> {
        if is_mock {
            return Ok(Self { saved: None });
        }

        let fd = get_terminal_fd()?;

        let mut attrs = termios::tcgetattr(&fd).map_err(|e| {
            ReadlineError::Terminal(format!(
                "failed to retrieve terminal attributes: {e}"
            ))
        })?;

        // rustix's Termios doesn't implement Copy, so clone the snapshot.
        let saved = attrs.clone();

        attrs.make_raw();

        termios::tcsetattr(&fd, OptionalActions::Now, &attrs).map_err(|e| {
            ReadlineError::Terminal(format!("failed to set terminal attributes: {e}"))
        })?;

        Ok(Self {
            saved: Some((fd, saved)),
        })
    }

    /// Restore the saved settings now instead of at drop. Idempotent; the
    /// second and later calls (including the one from [`Drop`]) do nothing.
    pub fn restore(&mut self) {
        if let Some((fd, saved)) = self.saved.take() {
            // Nothing useful to do with a failure here; the process is
            // usually on its way out of read_line.
            if let Err(e) = termios::tcsetattr(&fd, OptionalActions::Now, &saved) {
                tracing::warn!("failed to restore terminal attributes: {e}");
            }
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) { self.restore(); }
}
