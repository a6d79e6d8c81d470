//! Color themes and styling for TUI components.

use crate::core::DisplayClass;
use crate::render::StatusLabel;
use ratatui::style::{Color, Modifier, Style};

/// Color scheme for the workbench
pub struct Theme {
    /// Primary accent color (cyan for active elements)
    pub primary: Color,
    /// Success color (green for valid results and notices)
    pub success: Color,
    /// Error color (red for invalid results and the error modal)
    pub error: Color,
    /// Muted color (dark gray for hints and inactive elements)
    pub muted: Color,
    /// Text color (white for normal text)
    pub text: Color,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            primary: Color::Cyan,
            success: Color::Green,
            error: Color::Red,
            muted: Color::DarkGray,
            text: Color::White,
        }
    }

    /// Foreground color of a token class
    pub fn class_color(&self, class: DisplayClass) -> Color {
        match class {
            DisplayClass::Reserved => Color::Magenta,
            DisplayClass::Identifier => Color::LightBlue,
            DisplayClass::Number => Color::LightYellow,
            DisplayClass::String => Color::LightGreen,
            DisplayClass::Operator => Color::LightRed,
            DisplayClass::Delimiter => Color::Gray,
            DisplayClass::Conditional => Color::Yellow,
            DisplayClass::Loop => Color::LightMagenta,
            DisplayClass::Default => self.text,
        }
    }

    pub fn class_style(&self, class: DisplayClass) -> Style {
        let style = Style::default().fg(self.class_color(class));
        if class == DisplayClass::Reserved {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn status_style(&self, status: StatusLabel) -> Style {
        let color = match status {
            StatusLabel::Valid => self.success,
            StatusLabel::Invalid => self.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Style for the focused panel border
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.focused_border()
        } else {
            Style::default().fg(self.muted)
        }
    }

    /// Style for the selected token row
    pub fn selected_style(&self) -> Style {
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for hints and counters
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn toast_style(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    /// Style for active tabs
    pub fn active_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_creation() {
        let theme = Theme::default_theme();
        assert_eq!(theme.primary, Color::Cyan);
        assert_eq!(theme.success, Color::Green);
        assert_eq!(theme.muted, Color::DarkGray);
    }

    #[test]
    fn test_status_styles_differ() {
        let theme = Theme::default_theme();
        assert_ne!(
            theme.status_style(StatusLabel::Valid).fg,
            theme.status_style(StatusLabel::Invalid).fg
        );
    }

    #[test]
    fn test_unknown_class_uses_text_color() {
        let theme = Theme::default_theme();
        assert_eq!(theme.class_color(DisplayClass::Default), theme.text);
    }
}
