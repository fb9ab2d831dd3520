//! Turns parsed layout rows into a proportionally sized grid.
//!
//! Rows are consumed in groups. The tallest rowspan on the first row of a
//! group (H) decides how many input rows the group may absorb; every widget
//! of that first row opens a column, and widgets from the following rows are
//! stacked into the first column at or right of their own position that
//! still has room. With
//!
//! ```text
//! 3:cpu net
//! disk
//! mem
//! ```
//!
//! `cpu` fills the left column for three rows while `net`, `disk` and `mem`
//! stack on the right.

use super::parser::{Layout, WidgetSpec};

/// Weighted rows of weighted columns of stacked cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<W> {
    pub rows: Vec<GridRow<W>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<W> {
    /// Fraction of the total grid height.
    pub height: f64,
    /// Number of layout rows this group absorbed room for (H).
    pub span: u32,
    pub columns: Vec<GridColumn<W>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridColumn<W> {
    /// Fraction of the row width, relative to the group's first layout row.
    pub weight: f64,
    pub cells: Vec<GridCell<W>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<W> {
    /// Fraction of the row height (`row_span / H`).
    pub height: f64,
    pub item: W,
}

impl<W> Default for Grid<W> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<W> Grid<W> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every placed item, row by row, column by column, top to bottom.
    pub fn items(&self) -> impl Iterator<Item = &W> {
        self.rows
            .iter()
            .flat_map(|r| r.columns.iter())
            .flat_map(|c| c.cells.iter())
            .map(|cell| &cell.item)
    }
}

/// Builds the grid, calling `make` once for every widget spec in the layout.
pub fn build_grid<W, F>(layout: &Layout, mut make: F) -> Grid<W>
where
    F: FnMut(&WidgetSpec) -> W,
{
    let rows = &layout.rows;
    let mut out = Vec::new();
    let mut cursor = 0;

    while cursor < rows.len() {
        let (group, consumed) = build_group(&rows[cursor..], &mut make);
        cursor += consumed.max(1);
        if let Some(group) = group {
            out.push(group);
        }
    }

    // Spans go up to u32::MAX each, so the total needs the wider type.
    let total: u64 = out.iter().map(|r: &GridRow<W>| u64::from(r.span)).sum();
    let total = total.max(1) as f64;
    for row in &mut out {
        row.height = f64::from(row.span) / total;
    }

    Grid { rows: out }
}

struct ColumnSlot<W> {
    weight: f64,
    consumed: u32,
    cells: Vec<GridCell<W>>,
}

/// Builds one row-group from the front of `rows`.
///
/// Returns the group (None if its first row is empty) and how many input
/// rows it consumed.
fn build_group<W, F>(rows: &[Vec<WidgetSpec>], make: &mut F) -> (Option<GridRow<W>>, usize)
where
    F: FnMut(&WidgetSpec) -> W,
{
    let first = &rows[0];
    let span = first.iter().map(|s| s.row_span).max().unwrap_or(1).max(1);
    let candidates = &rows[..rows.len().min(span as usize)];

    let total_weight: u64 = first.iter().map(|s| u64::from(s.weight)).sum();
    let total_weight = total_weight.max(1) as f64;
    let mut columns: Vec<ColumnSlot<W>> = first
        .iter()
        .map(|s| ColumnSlot {
            weight: f64::from(s.weight) / total_weight,
            consumed: 0,
            cells: Vec::new(),
        })
        .collect();

    let mut consumed_rows = candidates.len();
    for (i, row) in candidates.iter().enumerate() {
        if columns.iter().all(|c| c.consumed >= span) {
            consumed_rows = i;
            break;
        }
        match plan_row(row, &columns, span) {
            Some(plan) => {
                for (spec, col) in row.iter().zip(plan) {
                    let slot = &mut columns[col];
                    slot.cells.push(GridCell {
                        height: f64::from(spec.row_span) / f64::from(span),
                        item: make(spec),
                    });
                    slot.consumed += spec.row_span;
                }
            }
            None => {
                consumed_rows = i;
                break;
            }
        }
    }

    let columns: Vec<GridColumn<W>> = columns
        .into_iter()
        .filter(|c| !c.cells.is_empty())
        .map(|c| GridColumn {
            weight: c.weight,
            cells: c.cells,
        })
        .collect();

    let group = (!columns.is_empty()).then_some(GridRow {
        height: 0.0,
        span,
        columns,
    });
    (group, consumed_rows)
}

/// Finds a column for every spec of `row`, or None if any of them has no room.
///
/// A row is placed whole or not at all, so an overflowing row starts the
/// next group intact instead of being split across two groups.
fn plan_row<W>(row: &[WidgetSpec], columns: &[ColumnSlot<W>], span: u32) -> Option<Vec<usize>> {
    let mut consumed: Vec<u32> = columns.iter().map(|c| c.consumed).collect();
    let mut plan = Vec::with_capacity(row.len());
    for (pos, spec) in row.iter().enumerate() {
        let col = (pos..consumed.len()).find(|&k| span - consumed[k] >= spec.row_span)?;
        consumed[col] += spec.row_span;
        plan.push(col);
    }
    Some(plan)
}
