//! Colors shared by the terminal UI and plain `ask` output.

use std::fmt;

use ratatui::style::Color;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// Border color for every panel.
pub const BORDER: Color = Color::Gray;

/// Semantic color of a message, title or chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Dodger blue; titles, chips and the selection.
    Accent,
    Info,
    Success,
    Warning,
    Danger,
}

impl Tone {
    pub const fn tui(self) -> Color {
        match self {
            Tone::Accent => Color::Rgb(30, 144, 255),
            Tone::Info => Color::Cyan,
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Danger => Color::Red,
        }
    }

    pub const fn ansi(self) -> &'static str {
        match self {
            Tone::Accent => "\x1b[38;2;30;144;255m",
            Tone::Info => "\x1b[36m",
            Tone::Success => "\x1b[32m",
            Tone::Warning => "\x1b[33m",
            Tone::Danger => "\x1b[31m",
        }
    }
}

pub fn paint(tone: Tone, value: impl fmt::Display) -> String {
    format!("{}{}{}", tone.ansi(), value, RESET)
}

pub fn dim(value: impl fmt::Display) -> String {
    format!("{DIM}{value}{RESET}")
}
