use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Row, Table},
    Frame,
};
use tokio_util::sync::CancellationToken;

use super::{accept_snapshot, block_title, lock};
use crate::{
    metrics::{
        types::{format_bytes, ContainerSnapshot},
        Collector, DockerClient,
    },
    ui::{colors::Theme, layout::COL_GAP},
};

pub const UPDATE_INTERVAL: Duration = Duration::from_secs(3);
const RATE_WIDTH: u16 = 12;

#[derive(Clone, Debug, PartialEq)]
pub struct NetRow {
    pub name: String,
    pub rx: u64,
    pub tx: u64,
    /// False on first sight of a container: `rx`/`tx` are totals, not per second.
    pub is_rate: bool,
}

impl NetRow {
    fn cell(&self, value: u64) -> String {
        if self.is_rate {
            format!("{}/s", format_bytes(value))
        } else {
            format_bytes(value)
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Counter {
    rx: u64,
    tx: u64,
    at: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct NetworkState {
    rows: Vec<NetRow>,
    previous: HashMap<String, Counter>,
    updated: Option<DateTime<Local>>,
}

impl NetworkState {
    pub fn apply(&mut self, snapshot: ContainerSnapshot) {
        if !accept_snapshot(&mut self.updated, snapshot.taken_at) {
            return;
        }
        let at = snapshot.taken_at;

        let mut next = HashMap::with_capacity(snapshot.containers.len());
        let mut rows = Vec::with_capacity(snapshot.containers.len());
        for c in snapshot.containers {
            let row = match self.previous.get(&c.id) {
                Some(prev) => rate_row(&c.name, prev, c.rx_bytes, c.tx_bytes, at),
                None => NetRow {
                    name: c.name.clone(),
                    rx: c.rx_bytes,
                    tx: c.tx_bytes,
                    is_rate: false,
                },
            };
            rows.push(row);
            next.insert(
                c.id,
                Counter {
                    rx: c.rx_bytes,
                    tx: c.tx_bytes,
                    at,
                },
            );
        }

        rows.sort_by(|a, b| a.name.cmp(&b.name));
        self.rows = rows;
        self.previous = next;
    }

    pub fn rows(&self) -> &[NetRow] {
        &self.rows
    }
}

/// Bytes per second since `prev`; counters that went backwards read as 0.
fn rate_row(name: &str, prev: &Counter, rx: u64, tx: u64, at: DateTime<Local>) -> NetRow {
    let secs = (at - prev.at).num_milliseconds() as f64 / 1000.0;
    if secs <= 0.0 {
        return NetRow {
            name: name.to_string(),
            rx,
            tx,
            is_rate: false,
        };
    }
    let per_sec = |now: u64, before: u64| (now.saturating_sub(before) as f64 / secs).round() as u64;
    NetRow {
        name: name.to_string(),
        rx: per_sec(rx, prev.rx),
        tx: per_sec(tx, prev.tx),
        is_rate: true,
    }
}

/// Table of per-container network throughput.
#[derive(Clone, Default)]
pub struct NetworkWidget {
    state: Arc<Mutex<NetworkState>>,
}

impl NetworkWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<NetworkState>> {
        Arc::clone(&self.state)
    }

    pub fn apply(&self, snapshot: ContainerSnapshot) {
        lock(&self.state).apply(snapshot);
    }

    pub fn spawn_collector(&self, docker: &DockerClient, parent: &CancellationToken) -> Collector {
        let docker = docker.clone();
        let state = self.state();
        Collector::spawn(
            "network",
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
        let state = lock(&self.state);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(block_title("Network usage", state.updated))
            .title_style(theme.title);

        let rows = state
            .rows
            .iter()
            .map(|r| Row::new(vec![r.name.clone(), r.cell(r.rx), r.cell(r.tx)]).style(theme.text));
        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(RATE_WIDTH),
                Constraint::Length(RATE_WIDTH),
            ],
        )
        .header(Row::new(vec!["Container", "Rx/s", "Tx/s"]).style(theme.header))
        .column_spacing(COL_GAP)
        .block(block);

        f.render_widget(table, area);
    }
}
