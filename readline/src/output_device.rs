// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Where rendered output goes: the real terminal, or a capture buffer in
//! tests.

use std::sync::Arc;

use crate::StdMutex;

/// The writer behind an [`OutputDevice`]. `Send` so a device can be handed
/// to another thread even though this crate itself never does.
pub type SendRawTerminal = dyn std::io::Write + Send;

/// Handle to the terminal's write side. Cloning is cheap and shares the
/// underlying writer.
///
/// `is_mock` tells raw-mode setup to skip the real termios calls, which
/// lets the full render path run in tests without a TTY.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct OutputDevice {
    resource: Arc<StdMutex<SendRawTerminal>>,
    pub is_mock: bool,
}

impl Default for OutputDevice {
    fn default() -> Self { Self::new_stdout() }
}

impl OutputDevice {
    #[must_use]
    pub fn new_stdout() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stdout())),
            is_mock: false,
        }
    }

    #[must_use]
    pub fn new_stderr() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stderr())),
            is_mock: false,
        }
    }

    /// Wrap an arbitrary writer, marking the device as a mock.
    #[must_use]
    pub fn new_mock(writer: impl std::io::Write + Send + 'static) -> Self {
        Self {
            resource: Arc::new(StdMutex::new(writer)),
            is_mock: true,
        }
    }

    /// Lock the writer for the duration of one render. Don't hold the guard
    /// across calls that lock again, it will deadlock.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned, i.e. a thread panicked while
    /// holding the lock.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, SendRawTerminal> {
        self.resource.lock().unwrap()
    }
}
