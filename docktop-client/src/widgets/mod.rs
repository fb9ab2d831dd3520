//! Dashboard widgets and the factory that builds them from layout specs.
//!
//! Each widget keeps its data in an `Arc<Mutex<_>>` shared between the
//! renderer and the widget's collector. Snapshots carry the time they were
//! taken; one older than what a widget already shows is dropped.

mod cpu;
mod host;
mod network;
mod placeholder;
mod volumes;

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};
use ratatui::{layout::Rect, style::Color, Frame};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use cpu::{display_name, CpuWidget};
pub use host::HostWidget;
pub use network::NetworkWidget;
pub use placeholder::PlaceholderWidget;
pub use volumes::VolumesWidget;

use crate::{
    config::Config,
    layout::WidgetSpec,
    metrics::{Collector, DockerClient, HostProbe},
    ui::colors::Theme,
};

/// Names accepted in a layout.
pub const KNOWN_WIDGETS: [&str; 4] = ["cpu", "host", "network", "volumes"];

/// Data sources shared by every collector.
#[derive(Clone, Debug, Default)]
pub struct Sources {
    pub docker: DockerClient,
    pub host: HostProbe,
}

/// Settings every widget is built with.
#[derive(Clone, Debug)]
pub struct WidgetOptions {
    pub max_containers: usize,
    pub horizontal_scale: u16,
    pub palette: Vec<Color>,
    pub label_bold: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self::new(&Config::default(), &Theme::default())
    }
}

impl WidgetOptions {
    pub fn new(config: &Config, theme: &Theme) -> Self {
        Self {
            max_containers: config.max_containers.max(1),
            horizontal_scale: config.graph_horizontal_scale.max(1),
            palette: theme.palette.clone(),
            label_bold: theme.label_bold,
        }
    }
}

pub enum WidgetHandle {
    Cpu(CpuWidget),
    Host(HostWidget),
    Network(NetworkWidget),
    Volumes(VolumesWidget),
    Placeholder(PlaceholderWidget),
}

impl WidgetHandle {
    pub fn name(&self) -> &str {
        match self {
            WidgetHandle::Cpu(_) => "cpu",
            WidgetHandle::Host(_) => "host",
            WidgetHandle::Network(_) => "network",
            WidgetHandle::Volumes(_) => "volumes",
            WidgetHandle::Placeholder(w) => w.name(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, WidgetHandle::Placeholder(_))
    }

    /// Paints the widget into `area`. Missing data draws as blank.
    pub fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        match self {
            WidgetHandle::Cpu(w) => w.draw(f, area, theme),
            WidgetHandle::Host(w) => w.draw(f, area, theme),
            WidgetHandle::Network(w) => w.draw(f, area, theme),
            WidgetHandle::Volumes(w) => w.draw(f, area, theme),
            WidgetHandle::Placeholder(w) => w.draw(f, area, theme),
        }
    }

    /// Starts the periodic updater feeding this widget, if it has a source.
    pub fn spawn_collector(&self, sources: &Sources, parent: &CancellationToken) -> Option<Collector> {
        match self {
            WidgetHandle::Cpu(w) => Some(w.spawn_collector(&sources.docker, parent)),
            WidgetHandle::Host(w) => Some(w.spawn_collector(&sources.host, parent)),
            WidgetHandle::Network(w) => Some(w.spawn_collector(&sources.docker, parent)),
            WidgetHandle::Volumes(w) => Some(w.spawn_collector(&sources.docker, parent)),
            WidgetHandle::Placeholder(_) => None,
        }
    }
}

/// Builds the widget named by `spec`; unknown names become a placeholder.
pub fn instantiate(spec: &WidgetSpec, opts: &WidgetOptions) -> WidgetHandle {
    match spec.name.as_str() {
        "cpu" => WidgetHandle::Cpu(CpuWidget::new(opts)),
        "host" => WidgetHandle::Host(HostWidget::new(opts)),
        "network" => WidgetHandle::Network(NetworkWidget::new()),
        "volumes" => WidgetHandle::Volumes(VolumesWidget::new()),
        other => {
            warn!(widget = %other, known = ?KNOWN_WIDGETS, "unknown widget, drawing a placeholder");
            WidgetHandle::Placeholder(PlaceholderWidget::new(other))
        }
    }
}

/// Locks widget state, recovering it if a previous holder panicked.
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("widget state lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Records `taken_at` as the newest applied snapshot, or returns false if it
/// is older than the one already applied.
pub(crate) fn accept_snapshot(last: &mut Option<DateTime<Local>>, taken_at: DateTime<Local>) -> bool {
    if let Some(prev) = *last {
        if taken_at < prev {
            debug!(%taken_at, %prev, "dropping stale snapshot");
            return false;
        }
    }
    *last = Some(taken_at);
    true
}

/// `" {title} · HH:MM:SS "`, or just the title before the first update.
pub(crate) fn block_title(title: &str, updated: Option<DateTime<Local>>) -> String {
    match updated {
        Some(at) => format!(" {title} · {} ", at.format("%H:%M:%S")),
        None => format!(" {title} "),
    }
}

#[cfg(test)]
pub(crate) fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut Frame, Rect),
{
    use ratatui::{backend::TestBackend, Terminal};

    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|f| {
            let area = f.area();
            draw(f, area)
        })
        .unwrap();
    let buf = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            out.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
        }
        out.push('\n');
    }
    out
}
