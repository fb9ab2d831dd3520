use std::{
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
        types::{Volume, VolumeSnapshot},
        Collector, DockerClient,
    },
    ui::{
        colors::Theme,
        layout::{calculate_name_width, COL_GAP},
    },
};

pub const UPDATE_INTERVAL: Duration = Duration::from_secs(3);
const SIZE_WIDTH: u16 = 10;

#[derive(Debug, Default)]
pub struct VolumesState {
    volumes: Vec<Volume>,
    updated: Option<DateTime<Local>>,
}

impl VolumesState {
    /// Replaces the table with `snapshot`, largest volume first.
    pub fn apply(&mut self, snapshot: VolumeSnapshot) {
        if !accept_snapshot(&mut self.updated, snapshot.taken_at) {
            return;
        }
        let mut volumes = snapshot.volumes;
        volumes.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.source.cmp(&b.source)));
        self.volumes = volumes;
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }
}

/// Table of mounted volumes and their size on disk.
#[derive(Clone, Default)]
pub struct VolumesWidget {
    state: Arc<Mutex<VolumesState>>,
}

impl VolumesWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<VolumesState>> {
        Arc::clone(&self.state)
    }

    pub fn apply(&self, snapshot: VolumeSnapshot) {
        lock(&self.state).apply(snapshot);
    }

    pub fn spawn_collector(&self, docker: &DockerClient, parent: &CancellationToken) -> Collector {
        let docker = docker.clone();
        let state = self.state();
        Collector::spawn(
            "volumes",
            UPDATE_INTERVAL,
            parent,
            move || {
                let docker = docker.clone();
                async move { docker.volume_snapshot().await }
            },
            move |snapshot| lock(&state).apply(snapshot),
        )
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let state = lock(&self.state);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(block_title("Storage usage", state.updated))
            .title_style(theme.title);

        let sources = state.volumes.iter().map(|v| v.source.as_str());
        let source_w = calculate_name_width(std::iter::once("Volume").chain(sources), 1);
        let rows = state.volumes.iter().map(|v| {
            Row::new(vec![
                v.source.clone(),
                v.destination.clone(),
                (v.size / 1024 / 1024).to_string(),
            ])
            .style(theme.text)
        });
        let table = Table::new(
            rows,
            [
                Constraint::Max(source_w),
                Constraint::Fill(1),
                Constraint::Length(SIZE_WIDTH),
            ],
        )
        .header(Row::new(vec!["Volume", "Destination", "Size (MiB)"]).style(theme.header))
        .column_spacing(COL_GAP)
        .block(block);

        f.render_widget(table, area);
    }
}
