//! Paints a widget grid: rows split the area vertically by height, columns
//! split each row by weight and cells stack inside a column.

use ratatui::{
    layout::{Direction, Rect},
    widgets::{Block, Borders},
    Frame,
};

use super::{colors::Theme, layout::weighted_split};
use crate::{layout::Grid, widgets::WidgetHandle};

const EPSILON: f64 = 1e-9;

pub fn render_grid(f: &mut Frame, area: Rect, grid: &mut Grid<WidgetHandle>, theme: &Theme) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    if grid.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border);
        f.render_widget(block, area);
        return;
    }

    let heights: Vec<f64> = grid.rows.iter().map(|r| r.height).collect();
    let row_areas = weighted_split(area, Direction::Vertical, &heights);

    for (row, row_area) in grid.rows.iter_mut().zip(row_areas.iter()) {
        let weights: Vec<f64> = row.columns.iter().map(|c| c.weight).collect();
        let col_areas = weighted_split(*row_area, Direction::Horizontal, &weights);

        for (column, col_area) in row.columns.iter_mut().zip(col_areas.iter()) {
            let mut heights: Vec<f64> = column.cells.iter().map(|c| c.height).collect();
            // A column not filled to the row's span leaves blank space below.
            let used: f64 = heights.iter().sum();
            if used < 1.0 - EPSILON {
                heights.push(1.0 - used);
            }
            let cell_areas = weighted_split(*col_area, Direction::Vertical, &heights);

            for (cell, cell_area) in column.cells.iter_mut().zip(cell_areas.iter()) {
                cell.item.draw(f, *cell_area, theme);
            }
        }
    }
}
