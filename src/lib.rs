//! vt100emu - VT100/ANSI terminal emulation library
//!
//! Feeds a stream of characters through a VT100 escape-sequence state machine
//! and applies the result to a pluggable display surface. Two surfaces are
//! provided:
//!
//! - [`GridDisplay`]: a fixed `width x height` cell grid, like a real screen
//! - [`CaptureDisplay`]: an unbounded collector that never wraps or scrolls,
//!   used to strip control sequences from captured program output
//!
//! # Example
//!
//! ```
//! use vt100emu::{display_width, trim};
//!
//! assert_eq!(trim("Hello\x1b[K world"), vec!["Hello world"]);
//! assert_eq!(display_width("\x1b[1mbold\x1b[m\r\nx"), (4, 2));
//! ```

pub mod config;
pub mod core;
pub mod editing;
pub mod hexdump;
pub mod text;
pub mod ui;

pub use crate::core::term::{
    CaptureDisplay, Cell, CellFlags, CharDisplay, Color, Emulator, EmulatorError, GridDisplay,
    ParserState, Point, Response,
};
pub use crate::text::{display_width, strip, trim};
