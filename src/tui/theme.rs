use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

use crate::palette::{BORDER, Tone};

/// Styles and blocks shared by every screen.
pub struct Theme;

impl Theme {
    const CHIP_FG: Color = Color::White;

    pub fn tone(tone: Tone) -> Style {
        let style = Style::default().fg(tone.tui());
        match tone {
            Tone::Info => style,
            _ => style.add_modifier(Modifier::BOLD),
        }
    }

    pub fn dim() -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }

    pub fn emphasis() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    /// Inverted accent, for the selected function and the active tab.
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::CHIP_FG)
            .bg(Tone::Accent.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn panel<'a>(title: impl Into<String>) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER))
            .title(Line::from(Self::styled(
                format!(" {} ", title.into()),
                Tone::Accent,
            )))
    }

    pub fn focused_panel<'a>(title: impl Into<String>) -> Block<'a> {
        Self::panel(title).border_style(Style::default().fg(Tone::Accent.tui()))
    }

    pub fn controls_panel<'a>() -> Block<'a> {
        Self::panel("Controls")
    }

    pub fn styled(text: impl Into<String>, tone: Tone) -> Span<'static> {
        Span::styled(text.into(), Self::tone(tone))
    }

    pub fn span(text: impl Into<String>) -> Span<'static> {
        Span::raw(text.into())
    }

    pub fn key_chip(text: impl Into<String>) -> Span<'static> {
        Span::styled(format!(" {} ", text.into()), Self::selected())
    }

    pub fn tab_chip(label: &str, active: bool) -> Span<'static> {
        let style = if active { Self::selected() } else { Self::dim() };
        Span::styled(format!(" {label} "), style)
    }

    pub fn bullet() -> Span<'static> {
        Self::span(" • ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_is_the_only_plain_tone() {
        assert!(!Theme::tone(Tone::Info).add_modifier.contains(Modifier::BOLD));
        assert!(Theme::tone(Tone::Danger).add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn chips_pad_their_label() {
        assert_eq!(Theme::key_chip("Ctrl+S").content, " Ctrl+S ");
        assert_eq!(Theme::tab_chip("Quiz", false).style, Theme::dim());
    }
}
