//! Line console
//!
//! Bridges the terminal to the session: an input side producing line and
//! close events, and a renderer that prints colored status lines without
//! leaving half-drawn prompts behind.

pub mod colors;
pub mod input;
pub mod renderer;

pub use colors::Color;
pub use input::{ConsoleEvent, ConsoleInput};
pub use renderer::Console;
