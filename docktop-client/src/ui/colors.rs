//! Resolved styles for drawing, built from a [`ColorScheme`].
//!
//! Widgets never look at scheme indices directly; they take a `&Theme`.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ColorScheme;

pub const HEADER: Color = Color::Rgb(0x56, 0x9C, 0xD6); // #569CD6 - blue
pub const GRAY: Color = Color::Rgb(0x66, 0x66, 0x66); // #666666 - dark gray

/// Scheme index to terminal color; negative means terminal default.
pub fn indexed(idx: i16) -> Color {
    u8::try_from(idx).map(Color::Indexed).unwrap_or(Color::Reset)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub text: Style,
    pub border: Style,
    pub title: Style,
    pub header: Style,
    pub muted: Style,
    pub palette: Vec<Color>,
    pub label_bold: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from(&ColorScheme::default())
    }
}

impl From<&ColorScheme> for Theme {
    fn from(scheme: &ColorScheme) -> Self {
        let text = Style::default().fg(indexed(scheme.fg)).bg(indexed(scheme.bg));
        let border = Style::default()
            .fg(indexed(scheme.border_fg))
            .bg(indexed(scheme.border_bg));
        let mut palette: Vec<Color> = scheme.series_colors.iter().map(|c| Color::Indexed(*c)).collect();
        if palette.is_empty() {
            palette.push(indexed(scheme.fg));
        }

        Self {
            text,
            border,
            title: border.add_modifier(Modifier::BOLD),
            header: Style::default().fg(HEADER).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(GRAY),
            palette,
            label_bold: scheme.label_bold,
        }
    }
}
