//! Braille dot canvas: 2 columns × 4 rows of dots per terminal cell.
//!
//! Dots are addressed in sub-pixel coordinates with (0, 0) at the top left.
//! Colors are tracked per cell, so the last color written to any dot of a
//! cell colors the whole glyph.

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

pub const DOTS_X: i32 = 2;
pub const DOTS_Y: i32 = 4;

const BRAILLE_BLANK: u32 = 0x2800;

/// Bit of the braille code point for the dot at (`dx`, `dy`) inside a cell.
fn dot_bit(dx: i32, dy: i32) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        _ => 0,
    }
}

#[derive(Debug, Clone)]
pub struct BrailleCanvas {
    width: u16,
    height: u16,
    masks: Vec<u8>,
    colors: Vec<Color>,
}

impl BrailleCanvas {
    /// Creates a blank canvas `width` × `height` cells large.
    pub fn new(width: u16, height: u16) -> Self {
        let cells = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            masks: vec![0; cells],
            colors: vec![Color::Reset; cells],
        }
    }

    pub fn dot_width(&self) -> i32 {
        i32::from(self.width) * DOTS_X
    }

    pub fn dot_height(&self) -> i32 {
        i32::from(self.height) * DOTS_Y
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.dot_width() || y >= self.dot_height() {
            return None;
        }
        let cx = (x / DOTS_X) as usize;
        let cy = (y / DOTS_Y) as usize;
        Some(cy * usize::from(self.width) + cx)
    }

    /// Sets one dot and colors its cell. Dots outside the canvas are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.cell_index(x, y) {
            self.masks[idx] |= dot_bit(x % DOTS_X, y % DOTS_Y);
            self.colors[idx] = color;
        }
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.cell_index(x, y)
            .is_some_and(|idx| self.masks[idx] & dot_bit(x % DOTS_X, y % DOTS_Y) != 0)
    }

    /// Sets every dot on the straight segment between two points.
    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color) {
        for (x, y) in rasterize_line(from.0, from.1, to.0, to.1) {
            self.set(x, y, color);
        }
    }

    /// True if no dot is set in cell (`cx`, `cy`).
    pub fn cell_is_empty(&self, cx: u16, cy: u16) -> bool {
        self.glyph(cx, cy).is_none()
    }

    /// The braille glyph and color of a cell, None if it has no dots.
    pub fn glyph(&self, cx: u16, cy: u16) -> Option<(char, Color)> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        let idx = usize::from(cy) * usize::from(self.width) + usize::from(cx);
        let mask = self.masks[idx];
        if mask == 0 {
            return None;
        }
        let ch = char::from_u32(BRAILLE_BLANK + u32::from(mask))?;
        Some((ch, self.colors[idx]))
    }

    /// Copies every non-empty cell into `buf`, with the canvas origin at `area`'s.
    pub fn flush(&self, area: Rect, buf: &mut Buffer) {
        for cy in 0..self.height.min(area.height) {
            for cx in 0..self.width.min(area.width) {
                let Some((ch, color)) = self.glyph(cx, cy) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_char(ch).set_fg(color);
                }
            }
        }
    }
}

/// Every dot on the segment from (`x0`, `y0`) to (`x1`, `y1`), both ends included.
///
/// Integer Bresenham over all octants: successive points differ by at most
/// one step on each axis.
pub fn rasterize_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut points = Vec::with_capacity(dx.max(-dy) as usize + 1);
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_dot_glyphs() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set(0, 0, Color::Red);
        assert_eq!(canvas.glyph(0, 0), Some(('⠁', Color::Red)));

        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set(1, 3, Color::Blue);
        assert_eq!(canvas.glyph(0, 0), Some(('⢀', Color::Blue)));
    }

    #[test]
    fn test_full_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..DOTS_X {
            for y in 0..DOTS_Y {
                canvas.set(x, y, Color::Green);
            }
        }
        assert_eq!(canvas.glyph(0, 0).map(|g| g.0), Some('⣿'));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set(-1, 0, Color::Red);
        canvas.set(4, 0, Color::Red);
        canvas.set(0, 4, Color::Red);
        assert!(canvas.cell_is_empty(0, 0));
        assert!(canvas.cell_is_empty(1, 0));
        assert!(!canvas.is_set(-1, 0));
    }

    #[test]
    fn test_last_color_wins_per_cell() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set(0, 0, Color::Red);
        canvas.set(1, 1, Color::Blue);
        assert_eq!(canvas.glyph(0, 0).map(|g| g.1), Some(Color::Blue));
    }

    #[test]
    fn test_flush_skips_empty_cells() {
        let mut canvas = BrailleCanvas::new(3, 1);
        canvas.set(2, 0, Color::Red);

        let area = Rect::new(1, 1, 3, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 3));
        buf.set_string(1, 1, "abc", ratatui::style::Style::default());
        canvas.flush(area, &mut buf);

        assert_eq!(buf.cell((1, 1)).unwrap().symbol(), "a");
        assert_eq!(buf.cell((2, 1)).unwrap().symbol(), "⠁");
        assert_eq!(buf.cell((2, 1)).unwrap().fg, Color::Red);
        assert_eq!(buf.cell((3, 1)).unwrap().symbol(), "c");
    }

    #[test]
    fn test_draw_line_marks_endpoints() {
        let mut canvas = BrailleCanvas::new(4, 2);
        canvas.draw_line((0, 7), (7, 0), Color::Red);
        assert!(canvas.is_set(0, 7));
        assert!(canvas.is_set(7, 0));
        assert!(canvas.is_set(3, 4) || canvas.is_set(4, 3));
    }

    #[test]
    fn test_horizontal_and_degenerate_lines() {
        assert_eq!(rasterize_line(2, 3, 5, 3), vec![(2, 3), (3, 3), (4, 3), (5, 3)]);
        assert_eq!(rasterize_line(1, 1, 1, 1), vec![(1, 1)]);
        assert_eq!(rasterize_line(0, 2, 0, 0), vec![(0, 2), (0, 1), (0, 0)]);
    }

    proptest! {
        #[test]
        fn prop_line_is_contiguous(
            x0 in -50i32..50, y0 in -50i32..50, x1 in -50i32..50, y1 in -50i32..50
        ) {
            let points = rasterize_line(x0, y0, x1, y1);
            prop_assert_eq!(points.first().copied(), Some((x0, y0)));
            prop_assert_eq!(points.last().copied(), Some((x1, y1)));
            let expected = (x1 - x0).abs().max((y1 - y0).abs()) as usize + 1;
            prop_assert_eq!(points.len(), expected);
            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
                prop_assert!(a != b);
            }
        }
    }
}
