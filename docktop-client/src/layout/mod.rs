//! Layout description language and the grid built from it.

pub mod grid;
pub mod parser;

pub use grid::{build_grid, Grid, GridCell, GridColumn, GridRow};
pub use parser::{parse_layout, Layout, WidgetSpec};

/// Layout used when neither the config nor the command line provides one.
pub const DEFAULT_LAYOUT: &str = "cpu\nvolumes network\n";
