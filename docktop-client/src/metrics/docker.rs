//! Container and volume snapshots gathered through the `docker` CLI.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Local;
use futures::future::try_join_all;
use serde::Deserialize;
use tokio::{process::Command, task};
use tracing::{debug, warn};

use super::types::{
    parse_io_pair, parse_percent, ContainerSnapshot, ContainerStat, Volume, VolumeSnapshot,
};
use crate::error::{Error, Result};

pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// One line of `docker stats --format {{json .}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CPUPerc")]
    cpu_perc: String,
    #[serde(rename = "MemPerc")]
    mem_perc: String,
    #[serde(rename = "MemUsage")]
    mem_usage: String,
    #[serde(rename = "NetIO")]
    net_io: String,
}

/// One element of `docker inspect --format {{json .Mounts}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Mount {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Destination")]
    destination: String,
}

#[derive(Clone, Debug)]
pub struct DockerClient {
    binary: String,
}

impl Default for DockerClient {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

impl DockerClient {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!(binary = %self.binary, ?args, "running docker");
        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Command {
                program: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Usage of every running container.
    #[tracing::instrument(skip(self))]
    pub async fn container_snapshot(&self) -> Result<ContainerSnapshot> {
        let out = self
            .run(&["stats", "--no-stream", "--format", "{{json .}}"])
            .await?;
        Ok(ContainerSnapshot {
            taken_at: Local::now(),
            containers: parse_stats_output(&out)?,
        })
    }

    /// Bind and volume mounts of every running container, with their sizes.
    #[tracing::instrument(skip(self))]
    pub async fn volume_snapshot(&self) -> Result<VolumeSnapshot> {
        let ps = self.run(&["ps", "-q"]).await?;
        let ids: Vec<&str> = ps.split_whitespace().collect();
        if ids.is_empty() {
            return Ok(VolumeSnapshot {
                taken_at: Local::now(),
                volumes: Vec::new(),
            });
        }

        let mut args = vec!["inspect", "--format", "{{json .Mounts}}"];
        args.extend(ids);
        let out = self.run(&args).await?;
        let mounts = parse_mounts_output(&out)?;

        let sizes = try_join_all(mounts.iter().map(|m| {
            let path = PathBuf::from(&m.source);
            task::spawn_blocking(move || directory_size(&path))
        }))
        .await?;

        let volumes = mounts
            .into_iter()
            .zip(sizes)
            .map(|(m, size)| Volume {
                name: m.name,
                source: m.source,
                destination: m.destination,
                size,
            })
            .collect();

        Ok(VolumeSnapshot {
            taken_at: Local::now(),
            volumes,
        })
    }
}

fn parse_stats_output(out: &str) -> Result<Vec<ContainerStat>> {
    let mut stats = Vec::new();
    for line in out.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let raw: StatsLine = serde_json::from_str(line)?;
        stats.push(container_stat(raw));
    }
    Ok(stats)
}

/// Docker prints `--` for containers it has no numbers for yet; those read as 0.
fn container_stat(raw: StatsLine) -> ContainerStat {
    let (rx_bytes, tx_bytes) = parse_io_pair(&raw.net_io).unwrap_or_else(|| {
        if !raw.net_io.trim().is_empty() && raw.net_io.trim() != "--" {
            warn!(container = %raw.name, input = %raw.net_io, "unreadable NetIO");
        }
        (0, 0)
    });
    let mem_used = parse_io_pair(&raw.mem_usage).map(|(used, _)| used).unwrap_or(0);
    let name = if raw.name.is_empty() {
        raw.id.clone()
    } else {
        raw.name
    };

    ContainerStat {
        id: raw.id,
        name,
        cpu_pct: parse_percent(&raw.cpu_perc).unwrap_or(0.0),
        mem_pct: parse_percent(&raw.mem_perc).unwrap_or(0.0),
        mem_used,
        rx_bytes,
        tx_bytes,
    }
}

/// One JSON array per inspected container; only bind and volume mounts are kept.
fn parse_mounts_output(out: &str) -> Result<Vec<Mount>> {
    let mut mounts = Vec::new();
    for line in out.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed: Option<Vec<Mount>> = serde_json::from_str(line)?;
        mounts.extend(
            parsed
                .unwrap_or_default()
                .into_iter()
                .filter(|m| m.kind == "bind" || m.kind == "volume"),
        );
    }
    Ok(mounts)
}

/// Total size of regular files under `path`; 0 if any part can't be read.
pub fn directory_size(path: &Path) -> u64 {
    match walk_size(path) {
        Ok(size) => size,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unable to size directory");
            0
        }
    }
}

fn walk_size(path: &Path) -> std::io::Result<u64> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_file() {
        return Ok(meta.len());
    }
    if !meta.is_dir() {
        return Ok(0);
    }
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        total += walk_size(&entry?.path())?;
    }
    Ok(total)
}
