//! Layout utilities for UI components.
//!
//! Provides the weighted splits used by the grid view and shared column
//! width helpers used by the table widgets.

use std::rc::Rc;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
};

/// Default gap between table columns.
pub const COL_GAP: u16 = 2;

/// Maximum width for name/title columns.
pub const MAX_TITLE_WIDTH: u16 = 100;

/// Resolution used to turn fractional weights into `Constraint::Fill` factors.
const FILL_SCALE: f64 = 1000.0;

/// Fill factor for a relative weight; never 0 so no part collapses to nothing.
pub fn fill_factor(weight: f64) -> u16 {
    if !weight.is_finite() || weight <= 0.0 {
        return 1;
    }
    (weight * FILL_SCALE).round().clamp(1.0, f64::from(u16::MAX)) as u16
}

/// Splits `area` along `direction` proportionally to `weights`.
pub fn weighted_split(area: Rect, direction: Direction, weights: &[f64]) -> Rc<[Rect]> {
    Layout::default()
        .direction(direction)
        .constraints(weights.iter().map(|w| Constraint::Fill(fill_factor(*w))))
        .split(area)
}

/// Calculates the optimal column width for a list of names.
///
/// Returns the width of the longest name (plus padding), clamped to MAX_TITLE_WIDTH.
pub fn calculate_name_width<'a>(names: impl Iterator<Item = &'a str>, padding: u16) -> u16 {
    names
        .map(|name| Line::from(name).width() as u16 + padding)
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_TITLE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_name_width() {
        let names = vec!["short", "medium-name", "very-long-name-here"];
        let width = calculate_name_width(names.iter().map(|s| *s), 2);

        // "very-long-name-here" is 19 chars + 2 padding = 21
        assert_eq!(width, 21);
        assert_eq!(calculate_name_width(std::iter::empty(), 2), 1);
    }

    #[test]
    fn test_fill_factor() {
        assert_eq!(fill_factor(0.25), 250);
        assert_eq!(fill_factor(0.0), 1);
        assert_eq!(fill_factor(f64::NAN), 1);
        assert_eq!(fill_factor(1e-9), 1);
    }

    #[test]
    fn test_weighted_split_proportions() {
        let area = Rect::new(0, 0, 100, 10);
        let parts = weighted_split(area, Direction::Horizontal, &[0.25, 0.75]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].width, 25);
        assert_eq!(parts[1].width, 75);
        assert_eq!(parts[1].x, 25);
    }

    #[test]
    fn test_weighted_split_vertical() {
        let area = Rect::new(0, 0, 10, 30);
        let parts = weighted_split(area, Direction::Vertical, &[0.2, 0.8]);
        assert_eq!(parts[0].height, 6);
        assert_eq!(parts[1].height, 24);
    }
}
