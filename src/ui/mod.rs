//! Rendering of emulated screens to a real terminal.
//!
//! - **renderer**: paints a [`GridDisplay`](crate::core::term::GridDisplay)
//!   snapshot with colors and attributes using crossterm

pub mod renderer;

pub use renderer::Renderer;
