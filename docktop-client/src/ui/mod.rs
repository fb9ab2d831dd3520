//! Terminal side of docktop: a ratatui grid of widgets redrawn on a ticker.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        dashboard.rs                          │
//! │  run_dashboard ─── Dashboard::run (select! poll loop)        │
//! │        │              ticker │ EventStream │ signals │ token  │
//! └────────┼─────────────────────────────────────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        grid_view.rs                          │
//! │  render_grid ─── rows ─── columns ─── WidgetHandle::draw     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `dashboard` - terminal setup/restore, panic hook and the poll loop
//! - `grid_view` - weighted row/column/cell splitting of a widget grid
//! - `events` - quit and resize handling
//! - `layout` - weighted splits and column width helpers
//! - `colors` - resolved styles built from a color scheme

pub mod colors;
pub mod dashboard;
pub mod events;
pub mod grid_view;
pub mod layout;

pub use dashboard::{run_dashboard, Dashboard};
