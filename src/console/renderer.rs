//! Console renderer
//!
//! Writes status and message lines over the prompt. Every `print` erases the
//! line the prompt sits on, writes the message in its color and redraws the
//! prompt, so output arriving from socket events never splices into the
//! user's half-typed input.

use log::debug;
use std::io::{self, IsTerminal, Stdout, Write};

use crate::config::Settings;
use crate::console::Color;

/// Erase the whole current line and return to column 0.
const CLEAR_LINE: &str = "\x1b[2K\r";

pub struct Console<W: Write = Stdout> {
    out: W,
    prompt: String,
    color: bool,
    interactive: bool,
    paused: bool,
}

impl Console<Stdout> {
    /// Console on the process stdout. Colors and prompt redraws are only
    /// emitted when stdout is a terminal.
    pub fn stdout(settings: &Settings) -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        Self {
            out,
            prompt: settings.prompt.clone(),
            color: settings.color && interactive,
            interactive,
            paused: false,
        }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, settings: &Settings) -> Self {
        Self {
            out,
            prompt: settings.prompt.clone(),
            color: settings.color,
            interactive: true,
            paused: false,
        }
    }

    /// Print `message` on its own line in `color`, then redraw the prompt.
    pub fn print(&mut self, message: &str, color: Color) {
        self.clear();
        let _ = if self.color {
            writeln!(self.out, "{}{}{}", color.code(), message, Color::Default.code())
        } else {
            writeln!(self.out, "{}", message)
        };
        self.prompt();
    }

    /// Erase the line holding the prompt and any partial input echo.
    pub fn clear(&mut self) {
        if self.interactive {
            let _ = self.out.write_all(CLEAR_LINE.as_bytes());
            let _ = self.out.flush();
        }
    }

    pub fn prompt(&mut self) {
        if self.interactive {
            let _ = self.out.write_all(self.prompt.as_bytes());
        }
        let _ = self.out.flush();
    }

    /// Stop accepting input; lines entered while paused are dropped.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.clear();
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pass an entered line through, or drop it and reset the input line
    /// while paused.
    pub fn accept_line(&mut self, line: String) -> Option<String> {
        if self.paused {
            debug!("Dropping console input while paused ({} bytes)", line.len());
            self.clear();
            return None;
        }
        Some(line)
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), &Settings::default())
    }

    fn output(console: &Console<Vec<u8>>) -> String {
        String::from_utf8(console.get_ref().clone()).unwrap()
    }

    #[test]
    fn test_print_clears_colors_and_redraws_prompt() {
        let mut console = console();
        console.print("connected", Color::Green);
        assert_eq!(
            output(&console),
            "\x1b[2K\r\x1b[32mconnected\x1b[39m\n> "
        );
    }

    #[test]
    fn test_print_keeps_payload_bytes() {
        let mut console = console();
        let payload = "< {\"k\": \"v\"} \u{1F600} [31m";
        console.print(payload, Color::Blue);
        let out = output(&console);
        let start = out.find(Color::Blue.code()).unwrap() + Color::Blue.code().len();
        let end = out.rfind(Color::Default.code()).unwrap();
        assert_eq!(&out[start..end], payload);
    }

    #[test]
    fn test_print_without_color() {
        let settings = Settings {
            color: false,
            ..Settings::default()
        };
        let mut console = Console::new(Vec::new(), &settings);
        console.print("disconnected", Color::Green);
        assert_eq!(output(&console), "\x1b[2K\rdisconnected\n> ");
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut console = console();
        console.pause();
        console.pause();
        assert!(console.is_paused());
        // a second pause does not clear again
        assert_eq!(output(&console), CLEAR_LINE);

        console.resume();
        console.resume();
        assert!(!console.is_paused());
    }

    #[test]
    fn test_lines_dropped_while_paused() {
        let mut console = console();
        console.pause();
        assert_eq!(console.accept_line("stray".into()), None);
        console.resume();
        assert_eq!(console.accept_line("hello".into()), Some("hello".into()));
    }
}
