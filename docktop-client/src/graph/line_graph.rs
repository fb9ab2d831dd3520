//! Scrolling multi-series line graph drawn with braille dots.
//!
//! The newest sample of every series is pinned to the right edge and older
//! samples walk left by `horizontal_scale` dots each. Values are percentages:
//! 0 maps to the bottom dot row and 100 to the top one.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::{
    canvas::{rasterize_line, BrailleCanvas},
    series::{Series, SeriesBuffer},
};

pub const DEFAULT_HORIZONTAL_SCALE: u16 = 5;

/// Column (relative to the graph area) where legend entries start.
const LEGEND_X: u16 = 2;
/// Blank columns between two legend columns.
const LEGEND_GAP: u16 = 2;

#[derive(Debug, Clone)]
pub struct LineGraph {
    /// Dots between two consecutive samples.
    pub horizontal_scale: u16,
    pub palette: Vec<Color>,
}

impl Default for LineGraph {
    fn default() -> Self {
        Self {
            horizontal_scale: DEFAULT_HORIZONTAL_SCALE,
            palette: vec![Color::Reset],
        }
    }
}

impl LineGraph {
    pub fn new(horizontal_scale: u16, palette: Vec<Color>) -> Self {
        Self {
            horizontal_scale: horizontal_scale.max(1),
            palette,
        }
    }

    fn color_of(&self, series: &Series) -> Color {
        if self.palette.is_empty() {
            return Color::Reset;
        }
        self.palette[series.color % self.palette.len()]
    }

    /// Draws every series of `data` and its legend into `area` of `buf`.
    ///
    /// Series history older than what fits the area is trimmed as a side effect.
    pub fn render(&self, data: &mut SeriesBuffer, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        data.set_visible_width(usize::from(area.width));

        let mut canvas = BrailleCanvas::new(area.width, area.height);
        let order = data.display_order();

        // Reverse so the first series in legend order ends up on top.
        for series in order.iter().rev() {
            self.plot(&mut canvas, series);
        }

        canvas.flush(area, buf);
        self.draw_legend(&canvas, &order, area, buf);
    }

    fn plot(&self, canvas: &mut BrailleCanvas, series: &Series) {
        let color = self.color_of(series);
        let scale = i32::from(self.horizontal_scale.max(1));
        let right = canvas.dot_width() - 1;
        let bottom = canvas.dot_height() - 1;

        let mut last: Option<(i32, i32)> = None;
        for (age, value) in series.samples.iter().rev().enumerate() {
            let x = right - age as i32 * scale;
            let y = value_to_y(*value, bottom);

            match last {
                None => canvas.set(x, y, color),
                Some((lx, ly)) => {
                    for (px, py) in rasterize_line(lx, ly, x, y) {
                        if px >= 0 {
                            canvas.set(px, py, color);
                        }
                    }
                }
            }

            if x < 0 {
                break;
            }
            last = Some((x, y));
        }
    }

    /// Writes `"key label"` for every series, wrapping into extra columns
    /// when the area is too short. Cells holding dots are left untouched.
    fn draw_legend(&self, canvas: &BrailleCanvas, order: &[&Series], area: Rect, buf: &mut Buffer) {
        let mut x_off: u16 = 0;
        let mut row: u16 = 0;
        let mut widest: u16 = 0;

        for series in order {
            if row >= area.height {
                x_off = x_off.saturating_add(widest).saturating_add(LEGEND_GAP);
                row = 0;
                widest = 0;
            }
            let start = LEGEND_X.saturating_add(x_off);
            if start >= area.width {
                break;
            }

            let text = if series.label.is_empty() {
                series.key.clone()
            } else {
                format!("{} {}", series.key, series.label)
            };
            widest = widest.max(Line::from(text.as_str()).width().min(usize::from(u16::MAX)) as u16);

            let mut style = Style::default().fg(self.color_of(series));
            if series.bold {
                style = style.add_modifier(Modifier::BOLD);
            }

            let mut cx = start;
            for ch in text.chars() {
                let width = char_width(ch);
                if width == 0 {
                    continue;
                }
                let end = cx.saturating_add(width);
                if end > area.width {
                    break;
                }
                let covered = (cx..end).any(|c| !canvas.cell_is_empty(c, row));
                if ch != ' ' && !covered {
                    if let Some(cell) = buf.cell_mut((area.x + cx, area.y + row)) {
                        cell.set_char(ch).set_style(style);
                    }
                    // Cells under the right half of a wide char stay blank.
                    for c in cx + 1..end {
                        if let Some(cell) = buf.cell_mut((area.x + c, area.y + row)) {
                            cell.reset();
                        }
                    }
                }
                cx = end;
            }
            row += 1;
        }
    }
}

/// Terminal columns taken by `ch`.
fn char_width(ch: char) -> u16 {
    let mut utf8 = [0u8; 4];
    Span::raw(&*ch.encode_utf8(&mut utf8)).width() as u16
}

/// Maps a percentage onto a dot row, 100 at the top.
fn value_to_y(value: f64, bottom: i32) -> i32 {
    let v = if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    };
    bottom - (f64::from(bottom) * v / 100.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(buf: &Buffer, x: u16, y: u16) -> String {
        buf.cell((x, y)).map(|c| c.symbol().to_string()).unwrap_or_default()
    }

    fn graph() -> LineGraph {
        LineGraph::new(5, vec![Color::Red, Color::Blue])
    }

    #[test]
    fn test_value_to_y() {
        assert_eq!(value_to_y(0.0, 7), 7);
        assert_eq!(value_to_y(100.0, 7), 0);
        assert_eq!(value_to_y(50.0, 7), 3);
        assert_eq!(value_to_y(250.0, 7), 0);
        assert_eq!(value_to_y(-3.0, 7), 7);
        assert_eq!(value_to_y(f64::NAN, 7), 7);
    }

    #[test]
    fn test_empty_data_draws_nothing() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        graph().render(&mut SeriesBuffer::new(2), area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn test_zero_area_is_ignored() {
        let mut data = SeriesBuffer::new(2);
        data.observe("k", 10.0);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 4));
        graph().render(&mut data, Rect::new(0, 0, 0, 4), &mut buf);
        graph().render(&mut data, Rect::new(0, 0, 4, 0), &mut buf);
        assert_eq!(buf, Buffer::empty(Rect::new(0, 0, 4, 4)));
    }

    #[test]
    fn test_flat_line_along_bottom() {
        let mut data = SeriesBuffer::new(2);
        for _ in 0..3 {
            data.observe("k", 0.0);
        }
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        // Samples land on dot columns 19, 14 and 9 of the bottom dot row.
        assert_eq!(symbol(&buf, 9, 1), "⣀");
        assert_eq!(symbol(&buf, 5, 1), "⣀");
        assert_eq!(symbol(&buf, 4, 1), "⢀");
        assert_eq!(symbol(&buf, 3, 1), " ");
        assert_eq!(buf.cell((9, 1)).unwrap().fg, Color::Red);

        assert_eq!(symbol(&buf, 2, 0), "k");
    }

    #[test]
    fn test_line_clipped_at_left_edge() {
        let mut data = SeriesBuffer::new(1);
        for _ in 0..5 {
            data.observe("k", 100.0);
        }
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        for x in 0..10 {
            assert_eq!(symbol(&buf, x, 0), "⠉", "column {x}");
        }
    }

    #[test]
    fn test_legend_never_covers_dots() {
        let mut data = SeriesBuffer::new(1);
        for _ in 0..5 {
            data.observe("key", 100.0);
        }
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        for x in 0..10 {
            let s = symbol(&buf, x, 0);
            assert!(s != "k" && s != "e" && s != "y", "legend drawn over dots at {x}");
        }
    }

    #[test]
    fn test_first_series_drawn_on_top() {
        let mut data = SeriesBuffer::new(2);
        data.observe("a", 50.0);
        data.observe("b", 50.0);
        data.observe("a", 50.0);
        data.observe("b", 50.0);
        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        assert_eq!(buf.cell((5, 0)).unwrap().fg, Color::Red);
    }

    #[test]
    fn test_render_trims_history() {
        let mut data = SeriesBuffer::new(1);
        for i in 0..30 {
            data.observe("k", i as f64);
        }
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);
        assert_eq!(data.get("k").unwrap().samples.len(), 4);
    }

    #[test]
    fn test_legend_wraps_into_columns() {
        let mut data = SeriesBuffer::new(2);
        data.observe("aa", 0.0);
        data.observe("bb", 0.0);
        data.observe("c", 0.0);
        data.set_label("aa", "1%");
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        assert_eq!(symbol(&buf, 2, 0), "a");
        assert_eq!(symbol(&buf, 5, 0), "1");
        assert_eq!(symbol(&buf, 2, 1), "b");
        // "aa 1%" is the widest entry of the first column: 2 + 5 + 2.
        assert_eq!(symbol(&buf, 9, 0), "c");
    }

    #[test]
    fn test_legend_measures_wide_chars_by_columns() {
        let mut data = SeriesBuffer::new(2);
        data.observe("a中文", 0.0);
        data.observe("b", 0.0);
        data.observe("c", 0.0);
        let area = Rect::new(0, 0, 14, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        assert_eq!(symbol(&buf, 2, 0), "a");
        assert_eq!(symbol(&buf, 3, 0), "中");
        assert_eq!(symbol(&buf, 5, 0), "文");
        assert_eq!(symbol(&buf, 2, 1), "b");
        // "a中文" is five columns wide: 2 + 5 + 2.
        assert_eq!(symbol(&buf, 9, 0), "c");
    }

    #[test]
    fn test_legend_drops_wide_char_past_right_edge() {
        let mut data = SeriesBuffer::new(1);
        data.observe("ab中", 0.0);
        let area = Rect::new(0, 0, 5, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);

        assert_eq!(symbol(&buf, 3, 0), "b");
        assert_eq!(symbol(&buf, 4, 0), " ");
    }

    #[test]
    fn test_bold_labels() {
        let mut data = SeriesBuffer::new(1);
        data.observe("k", 0.0);
        data.set_bold("k", true);
        let area = Rect::new(0, 0, 8, 2);
        let mut buf = Buffer::empty(area);
        graph().render(&mut data, area, &mut buf);
        assert!(buf.cell((2, 0)).unwrap().modifier.contains(Modifier::BOLD));
    }
}
