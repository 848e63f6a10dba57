//! Plain-text extraction from output containing control sequences.
//!
//! Each call runs the input through a fresh emulator bound to a
//! [`CaptureDisplay`] and reads the collected rows back.

use crate::core::term::{CaptureDisplay, Emulator};

fn capture(data: &str) -> CaptureDisplay {
    let mut emulator = Emulator::new(CaptureDisplay::new());
    emulator.feed_str(data);
    emulator.into_display()
}

/// Width (longest row) and height (row count) of `data` once all control
/// sequences have been interpreted.
pub fn display_width(data: &str) -> (usize, usize) {
    let display = capture(data);
    (display.width(), display.height())
}

/// Text rows of `data` with control sequences removed.
pub fn trim(data: &str) -> Vec<String> {
    capture(data).lines()
}

/// [`trim`] joined with newlines.
pub fn strip(data: &str) -> String {
    trim(data).join("\n")
}
