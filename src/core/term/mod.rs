//! VT100 terminal emulation: cell model, display surfaces, parser and the
//! emulator that ties them together.

pub mod capture;
pub mod cell;
pub mod display;
pub mod emulator;
pub mod grid;
pub mod parser;

pub use capture::CaptureDisplay;
pub use cell::{Cell, CellFlags, Color, Point};
pub use display::CharDisplay;
pub use emulator::{Emulator, EmulatorError, Response};
pub use grid::GridDisplay;
pub use parser::{ParserState, Transition};
