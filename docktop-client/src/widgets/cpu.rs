use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
    Frame,
};
use tokio_util::sync::CancellationToken;

use super::{accept_snapshot, block_title, lock, WidgetOptions};
use crate::{
    graph::{LineGraph, SeriesBuffer},
    metrics::{
        types::{ContainerSnapshot, ContainerStat},
        Collector, DockerClient,
    },
    ui::colors::Theme,
};

pub const UPDATE_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_LABEL_LEN: usize = 30;
const SHORT_ID_LEN: usize = 12;

/// Container name as shown in the legend, cut to [`MAX_LABEL_LEN`] chars.
pub fn display_name(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_LEN {
        let head: String = name.chars().take(MAX_LABEL_LEN).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Legend keys for `containers`. Names that collide once truncated get a
/// short container id appended.
fn series_keys(containers: &[ContainerStat]) -> Vec<String> {
    let names: Vec<String> = containers.iter().map(|c| display_name(&c.name)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    containers
        .iter()
        .zip(&names)
        .map(|(c, name)| {
            if counts[name.as_str()] > 1 {
                let short: String = c.id.chars().take(SHORT_ID_LEN).collect();
                format!("{name} ({short})")
            } else {
                name.clone()
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct CpuState {
    series: SeriesBuffer,
    updated: Option<DateTime<Local>>,
    max_containers: usize,
    label_bold: bool,
}

impl CpuState {
    fn new(opts: &WidgetOptions) -> Self {
        Self {
            series: SeriesBuffer::new(opts.palette.len()),
            updated: None,
            max_containers: opts.max_containers,
            label_bold: opts.label_bold,
        }
    }

    /// Adds one sample per busiest container and forgets the rest.
    pub fn apply(&mut self, snapshot: ContainerSnapshot) {
        if !accept_snapshot(&mut self.updated, snapshot.taken_at) {
            return;
        }

        let mut top = snapshot.containers;
        top.sort_by(|a, b| b.cpu_pct.total_cmp(&a.cpu_pct).then_with(|| a.name.cmp(&b.name)));
        top.truncate(self.max_containers);

        let keys = series_keys(&top);
        let current: HashSet<&str> = keys.iter().map(String::as_str).collect();
        self.series.retain_keys(|k| current.contains(k));

        for (c, key) in top.iter().zip(&keys) {
            self.series.observe(key, c.cpu_pct);
            self.series.set_label(key, format!("{:.1}%", c.cpu_pct));
            self.series.set_bold(key, self.label_bold);
        }
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }
}

/// Line graph of the busiest containers' CPU usage.
#[derive(Clone)]
pub struct CpuWidget {
    state: Arc<Mutex<CpuState>>,
    graph: LineGraph,
}

impl CpuWidget {
    pub fn new(opts: &WidgetOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(CpuState::new(opts))),
            graph: LineGraph::new(opts.horizontal_scale, opts.palette.clone()),
        }
    }

    pub fn state(&self) -> Arc<Mutex<CpuState>> {
        Arc::clone(&self.state)
    }

    pub fn apply(&self, snapshot: ContainerSnapshot) {
        lock(&self.state).apply(snapshot);
    }

    pub fn spawn_collector(&self, docker: &DockerClient, parent: &CancellationToken) -> Collector {
        let docker = docker.clone();
        let state = self.state();
        Collector::spawn(
            "cpu",
            UPDATE_INTERVAL,
            parent,
            move || {
                let docker = docker.clone();
                async move { docker.container_snapshot().await }
            },
            move |snapshot| lock(&state).apply(snapshot),
        )
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let mut state = lock(&self.state);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(block_title("CPU load", state.updated))
            .title_style(theme.title);
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.graph.render(&mut state.series, inner, f.buffer_mut());
    }
}
