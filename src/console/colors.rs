//! Display colors
//!
//! ANSI SGR foreground codes used for status and message lines.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Cyan,
    Blue,
    Default,
}

impl Color {
    pub fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Cyan => "\x1b[36m",
            Color::Blue => "\x1b[34m",
            Color::Default => "\x1b[39m",
        }
    }
}
