// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Where raw input bytes come from: the real terminal, or a canned byte
//! script in tests.

use std::io::Read;

/// Handle to the terminal's read side.
///
/// Reads are blocking and deliver whatever bytes are available, which may
/// split an escape sequence or a multi-byte UTF-8 character across calls;
/// the key decoder reassembles them. A mock device replays a fixed byte
/// script and then reports end of input (`read` returns 0).
#[allow(missing_debug_implementations)]
pub struct InputDevice {
    resource: Box<dyn Read + Send>,
    pub is_mock: bool,
}

impl InputDevice {
    #[must_use]
    pub fn new_stdin() -> Self {
        Self {
            resource: Box::new(std::io::stdin()),
            is_mock: false,
        }
    }

    /// Replay `bytes` as if the user had typed them, then report EOF.
    #[must_use]
    pub fn new_mock(bytes: Vec<u8>) -> Self {
        Self {
            resource: Box::new(std::io::Cursor::new(bytes)),
            is_mock: true,
        }
    }

    /// Blocking read of whatever bytes are available, up to `buf.len()`.
    /// Returns 0 only at end of input.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying reader.
    pub fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.resource.read(buf)
    }
}
