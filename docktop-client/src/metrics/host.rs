//! Host CPU, memory, swap and disk usage read through sysinfo.

use std::sync::{Arc, Mutex};

use chrono::Local;
use sysinfo::{Disks, System};
use tokio::task;
use tracing::warn;

use super::types::{HostInfo, HostSnapshot};
use crate::error::Result;

struct Probe {
    system: System,
    disks: Disks,
}

impl Probe {
    fn read(&mut self) -> HostInfo {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh_list();

        let (disk_used, disk_total) = disk_usage(
            self.disks
                .list()
                .iter()
                .map(|d| (d.total_space(), d.available_space())),
        );

        HostInfo {
            cpu_pct: f64::from(self.system.global_cpu_usage()),
            mem_used: self.system.used_memory(),
            mem_total: self.system.total_memory(),
            swap_used: self.system.used_swap(),
            swap_total: self.system.total_swap(),
            disk_used,
            disk_total,
        }
    }
}

/// Cloneable handle to one sysinfo reader.
///
/// CPU usage is a delta between two refreshes, so the first snapshot of a
/// fresh probe reports 0% and later ones are accurate.
#[derive(Clone)]
pub struct HostProbe {
    inner: Arc<Mutex<Probe>>,
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostProbe").finish_non_exhaustive()
    }
}

impl HostProbe {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Probe {
                system: System::new(),
                disks: Disks::new_with_refreshed_list(),
            })),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn host_snapshot(&self) -> Result<HostSnapshot> {
        let inner = Arc::clone(&self.inner);
        let info = task::spawn_blocking(move || {
            let mut probe = match inner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    warn!("host probe lock poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            probe.read()
        })
        .await?;

        Ok(HostSnapshot {
            taken_at: Local::now(),
            info,
        })
    }
}

/// Sums `(total, available)` pairs into `(used, total)`.
fn disk_usage<I>(disks: I) -> (u64, u64)
where
    I: IntoIterator<Item = (u64, u64)>,
{
    disks
        .into_iter()
        .fold((0, 0), |(used, total), (t, available)| {
            (used + t.saturating_sub(available), total + t)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_usage_sums_disks() {
        assert_eq!(disk_usage([(100, 40), (50, 50)]), (60, 150));
        assert_eq!(disk_usage(Vec::new()), (0, 0));
    }

    #[test]
    fn test_disk_usage_tolerates_bogus_available() {
        assert_eq!(disk_usage([(10, 20)]), (0, 10));
    }

    #[tokio::test]
    async fn test_host_snapshot_is_consistent() {
        let probe = HostProbe::new();
        let snapshot = probe.host_snapshot().await.unwrap();
        let info = snapshot.info;
        assert!(info.mem_used <= info.mem_total);
        assert!(info.disk_used <= info.disk_total);
        assert!((0.0..=100.0).contains(&info.cpu_pct) || info.cpu_pct.is_nan());
    }
}
