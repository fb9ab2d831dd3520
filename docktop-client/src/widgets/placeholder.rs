use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
    Frame,
};

use crate::ui::colors::Theme;

/// Empty bordered block standing in for a widget name nobody recognized.
#[derive(Clone, Debug)]
pub struct PlaceholderWidget {
    name: String,
}

impl PlaceholderWidget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.muted)
            .title(format!(" {} ", self.name))
            .title_style(theme.muted);
        f.render_widget(block, area);
    }
}
