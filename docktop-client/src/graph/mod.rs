pub mod canvas;
pub mod line_graph;
pub mod series;

pub use canvas::BrailleCanvas;
pub use line_graph::{LineGraph, DEFAULT_HORIZONTAL_SCALE};
pub use series::{Series, SeriesBuffer};
