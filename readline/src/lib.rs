// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Synchronous raw-mode line editor.
//!
//! This crate is a blocking replacement for [`std::io::BufRead::read_line`]
//! for interactive terminals. Each call to [`Readline::read_line`]:
//!
//! 1. Puts the terminal into raw mode ([`RawModeGuard`] restores the saved
//!    settings on every exit path, including errors).
//! 2. Reads raw bytes from the input device and decodes them into
//!    [`KeyEvent`]s ([`KeyDecoder`]) — printable characters (including
//!    multi-byte UTF-8), Enter, Backspace, Delete, arrow keys, and the
//!    Ctrl-C / Ctrl-D terminators. Escape sequences that never complete are
//!    recovered locally as [`KeyEvent::Unknown`].
//! 3. Applies each event to a grapheme-indexed [`LineBuffer`] or to the
//!    [`History`] browse cursor, and redraws the prompt + line with a
//!    minimal-overwrite [`Renderer`].
//!
//! Input and output go through [`InputDevice`] / [`OutputDevice`] so tests
//! can substitute in-memory byte sources and sinks for the real terminal.
//! History is append-only and owned by the caller's [`Readline`] instance;
//! whether a submitted line is appended is the caller's decision via
//! [`Readline::add_history_entry`].

// Attach sources.
pub mod history;
pub mod input_device;
pub mod key_decoder;
pub mod line_buffer;
pub mod output_device;
pub mod raw_mode;
pub mod readline;
pub mod renderer;
pub mod test_fixtures;

// Re-export.
pub use history::*;
pub use input_device::*;
pub use key_decoder::*;
pub use line_buffer::*;
pub use output_device::*;
pub use raw_mode::*;
pub use readline::*;
pub use renderer::*;

/// Type alias for one [`std::sync::Mutex`] flavor, to make it easy to swap
/// between different implementations.
pub type StdMutex<T> = std::sync::Mutex<T>;
