//! Core terminal emulation components.
//!
//! - **term**: escape-sequence state machine, emulator coordinator and the
//!   display surfaces it drives
//!
//! # Architecture
//!
//! ```text
//! Emulator::input(code)
//! ├── parser::step(state, code) -> (action, next state)
//! ├── action: cursor / attributes / scroll region updates
//! └── CharDisplay (the only sink for screen changes)
//!     ├── GridDisplay    (fixed width x height)
//!     └── CaptureDisplay (unbounded rows, text extraction)
//! ```

pub mod term;
