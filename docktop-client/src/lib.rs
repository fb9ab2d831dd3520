//! docktop: a terminal dashboard for docker containers and the host.
//!
//! A small layout language describes a grid of widgets. Each widget owns its
//! state and a collector that refreshes it from `docker` or the host in the
//! background while the dashboard redraws on a ticker.

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod log;
pub mod metrics;
pub mod ui;
pub mod widgets;

pub use error::{Error, Result};
