// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! In-memory stand-ins for the terminal, used by unit and integration
//! tests. Compiled into the library so integration tests under `tests/`
//! can use them too.

use std::{io::{Result, Write},
          sync::Arc};

use strip_ansi_escapes::strip;

use crate::{OutputDevice, StdMutex};

/// Capture buffer for everything the renderer writes. You can safely clone
/// this struct; the clone shares the same buffer via [`Arc`].
#[derive(Clone, Default)]
#[allow(missing_debug_implementations)]
pub struct StdoutMock {
    buffer: Arc<StdMutex<Vec<u8>>>,
}

impl StdoutMock {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// # Panics
    ///
    /// Panics if the captured bytes aren't valid UTF-8.
    #[must_use]
    pub fn get_copy_of_buffer_as_string(&self) -> String {
        let buffer_data = self.buffer.lock().unwrap();
        String::from_utf8(buffer_data.clone()).expect("utf8")
    }

    /// The captured output with all ANSI escape sequences removed, leaving
    /// just the text a user would see. Cursor-movement and color sequences
    /// vary with terminal width, so assertions target this form.
    ///
    /// # Panics
    ///
    /// Panics if the stripped bytes aren't valid UTF-8.
    #[must_use]
    pub fn get_copy_of_buffer_as_string_strip_ansi(&self) -> String {
        let buffer_data = self.buffer.lock().unwrap();
        let stripped = strip(buffer_data.clone());
        String::from_utf8(stripped).expect("utf8")
    }
}

impl Write for StdoutMock {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

/// Build a mock [`OutputDevice`] together with the [`StdoutMock`] that
/// captures everything written to it.
#[must_use]
pub fn output_device_mock_pair() -> (OutputDevice, StdoutMock) {
    let stdout_mock = StdoutMock::default();
    let device = OutputDevice::new_mock(stdout_mock.clone());
    (device, stdout_mock)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mock_captures_plain_text() {
        let mut stdout_mock = StdoutMock::default();
        let stdout_mock_clone = stdout_mock.clone();

        stdout_mock.write_all(b"hello world").unwrap();
        stdout_mock.flush().unwrap();

        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "hello world");
        // The clone shares the same buffer.
        assert_eq!(
            stdout_mock_clone.get_copy_of_buffer_as_string(),
            "hello world"
        );
    }

    #[test]
    fn strip_ansi_removes_color_sequences() {
        let mut stdout_mock = StdoutMock::default();
        let red_text = "\x1b[31mhello world\x1b[0m";

        stdout_mock.write_all(red_text.as_bytes()).unwrap();

        assert_eq!(
            stdout_mock.get_copy_of_buffer_as_string_strip_ansi(),
            "hello world"
        );
    }

    #[test]
    fn device_pair_routes_writes_into_the_mock() {
        let (device, mock) = output_device_mock_pair();

        {
            let mut writer = device.lock();
            writer.write_all(b"captured").unwrap();
        }

        assert!(device.is_mock);
        assert_eq!(mock.get_copy_of_buffer_as_string(), "captured");
    }
}
