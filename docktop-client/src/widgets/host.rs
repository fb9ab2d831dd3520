use std::{
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
        types::{format_bytes, percent_of, HostSnapshot},
        Collector, HostProbe,
    },
    ui::colors::Theme,
};

pub const UPDATE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct HostState {
    series: SeriesBuffer,
    updated: Option<DateTime<Local>>,
    label_bold: bool,
}

impl HostState {
    fn new(opts: &WidgetOptions) -> Self {
        Self {
            series: SeriesBuffer::new(opts.palette.len()),
            updated: None,
            label_bold: opts.label_bold,
        }
    }

    pub fn apply(&mut self, snapshot: HostSnapshot) {
        if !accept_snapshot(&mut self.updated, snapshot.taken_at) {
            return;
        }
        let info = snapshot.info;

        self.record("cpu", info.cpu_pct, format!("{:.1}%", info.cpu_pct));
        self.record_usage("mem", info.mem_used, info.mem_total);
        self.record_usage("swap", info.swap_used, info.swap_total);
        self.record_usage("disk", info.disk_used, info.disk_total);
    }

    fn record_usage(&mut self, key: &str, used: u64, total: u64) {
        let label = format!("{}/{}", format_bytes(used), format_bytes(total));
        self.record(key, percent_of(used, total), label);
    }

    fn record(&mut self, key: &str, pct: f64, label: String) {
        self.series.observe(key, pct);
        self.series.set_label(key, label);
        self.series.set_bold(key, self.label_bold);
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }
}

/// Line graph of host CPU, memory, swap and disk usage.
#[derive(Clone)]
pub struct HostWidget {
    state: Arc<Mutex<HostState>>,
    graph: LineGraph,
}

impl HostWidget {
    pub fn new(opts: &WidgetOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState::new(opts))),
            graph: LineGraph::new(opts.horizontal_scale, opts.palette.clone()),
        }
    }

    pub fn state(&self) -> Arc<Mutex<HostState>> {
        Arc::clone(&self.state)
    }

    pub fn apply(&self, snapshot: HostSnapshot) {
        lock(&self.state).apply(snapshot);
    }

    pub fn spawn_collector(&self, probe: &HostProbe, parent: &CancellationToken) -> Collector {
        let probe = probe.clone();
        let state = self.state();
        Collector::spawn(
            "host",
            UPDATE_INTERVAL,
            parent,
            move || {
                let probe = probe.clone();
                async move { probe.host_snapshot().await }
            },
            move |snapshot| lock(&state).apply(snapshot),
        )
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let mut state = lock(&self.state);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(block_title("Host usage", state.updated))
            .title_style(theme.title);
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.graph.render(&mut state.series, inner, f.buffer_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::types::HostInfo;

    fn info() -> HostInfo {
        HostInfo {
            cpu_pct: 42.0,
            mem_used: 1024,
            mem_total: 4096,
            swap_used: 0,
            swap_total: 0,
            disk_used: 3 << 30,
            disk_total: 4 << 30,
        }
    }

    #[test]
    fn test_records_all_keys() {
        let mut state = HostState::new(&WidgetOptions::default());
        state.apply(HostSnapshot {
            taken_at: Local::now(),
            info: info(),
        });

        let keys: Vec<&str> = state.series().keys().collect();
        assert_eq!(keys, vec!["cpu", "disk", "mem", "swap"]);

        let mem = state.series().get("mem").unwrap();
        assert_eq!(mem.samples.back(), Some(&25.0));
        assert_eq!(mem.label, "1.0 KiB/4.0 KiB");

        assert_eq!(state.series().get("swap").unwrap().samples.back(), Some(&0.0));
        assert_eq!(state.series().get("disk").unwrap().samples.back(), Some(&75.0));
        assert_eq!(state.series().get("cpu").unwrap().label, "42.0%");
    }

    #[test]
    fn test_stale_snapshot_ignored() {
        let now = Local::now();
        let widget = HostWidget::new(&WidgetOptions::default());
        widget.apply(HostSnapshot { taken_at: now, info: info() });
        widget.apply(HostSnapshot {
            taken_at: now - chrono::Duration::seconds(5),
            info: HostInfo::default(),
        });

        let shared = widget.state();
        let state = lock(&shared);
        assert_eq!(state.series().get("cpu").unwrap().samples.len(), 1);
    }
}
