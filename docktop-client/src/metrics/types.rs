//! Snapshot records produced by the sources plus docker quantity parsing helpers.

use chrono::{DateTime, Local};

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerStat {
    pub id: String,
    pub name: String,
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub mem_used: u64,
    /// Cumulative bytes received since the container started.
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct ContainerSnapshot {
    pub taken_at: DateTime<Local>,
    pub containers: Vec<ContainerStat>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostInfo {
    pub cpu_pct: f64,
    pub mem_used: u64,
    pub mem_total: u64,
    pub swap_used: u64,
    pub swap_total: u64,
    pub disk_used: u64,
    pub disk_total: u64,
}

#[derive(Clone, Debug)]
pub struct HostSnapshot {
    pub taken_at: DateTime<Local>,
    pub info: HostInfo,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    pub name: String,
    pub source: String,
    pub destination: String,
    /// Bytes on disk under `source`.
    pub size: u64,
}

#[derive(Clone, Debug)]
pub struct VolumeSnapshot {
    pub taken_at: DateTime<Local>,
    pub volumes: Vec<Volume>,
}

/// `used / total` as a percentage, 0 when `total` is 0.
pub fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

/// Parse a docker percentage such as `"12.5%"`.
pub fn parse_percent(s: &str) -> Option<f64> {
    let n = s.trim().strip_suffix('%')?;
    n.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a docker human size such as `"1.5kB"` or `"3.2MiB"` to bytes
pub fn parse_size_to_bytes(s: &str) -> Option<u64> {
    // Longest suffixes first so "MiB" is not taken for "B".
    let suffixes: &[(&str, u64)] = &[
        ("EiB", 1024 * 1024 * 1024 * 1024 * 1024 * 1024),
        ("PiB", 1024 * 1024 * 1024 * 1024 * 1024),
        ("TiB", 1024 * 1024 * 1024 * 1024),
        ("GiB", 1024 * 1024 * 1024),
        ("MiB", 1024 * 1024),
        ("KiB", 1024),
        ("EB", 1000 * 1000 * 1000 * 1000 * 1000 * 1000),
        ("PB", 1000 * 1000 * 1000 * 1000 * 1000),
        ("TB", 1000 * 1000 * 1000 * 1000),
        ("GB", 1000 * 1000 * 1000),
        ("MB", 1000 * 1000),
        ("kB", 1000),
        ("KB", 1000),
        ("B", 1),
    ];

    let s = s.trim();
    for (suffix, multiplier) in suffixes {
        if let Some(n) = s.strip_suffix(suffix) {
            return n
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| (v * (*multiplier as f64)).round() as u64);
        }
    }

    s.parse::<u64>().ok()
}

/// Split docker's `"rx / tx"` pair (NetIO, BlockIO) into two byte counts.
pub fn parse_io_pair(s: &str) -> Option<(u64, u64)> {
    let (a, b) = s.split_once('/')?;
    Some((parse_size_to_bytes(a)?, parse_size_to_bytes(b)?))
}

/// Human readable binary size, e.g. `"1.5 GiB"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("12.5%"), Some(12.5));
        assert_eq!(parse_percent(" 0.00% "), Some(0.0));
        assert_eq!(parse_percent("--"), None);
        assert_eq!(parse_percent("12.5"), None);
    }

    #[test]
    fn test_parse_size_decimal_and_binary() {
        assert_eq!(parse_size_to_bytes("0B"), Some(0));
        assert_eq!(parse_size_to_bytes("1.5kB"), Some(1500));
        assert_eq!(parse_size_to_bytes("2MB"), Some(2_000_000));
        assert_eq!(parse_size_to_bytes("1KiB"), Some(1024));
        assert_eq!(parse_size_to_bytes("1.5MiB"), Some(1_572_864));
        assert_eq!(parse_size_to_bytes("1GiB"), Some(1 << 30));
        assert_eq!(parse_size_to_bytes("42"), Some(42));
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert_eq!(parse_size_to_bytes("abcMB"), None);
        assert_eq!(parse_size_to_bytes("-1MB"), None);
        assert_eq!(parse_size_to_bytes(""), None);
    }

    #[test]
    fn test_parse_io_pair() {
        assert_eq!(parse_io_pair("1.2kB / 648B"), Some((1200, 648)));
        assert_eq!(parse_io_pair("0B / 0B"), Some((0, 0)));
        assert_eq!(parse_io_pair("1.2kB"), None);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 4), 25.0);
        assert_eq!(percent_of(5, 0), 0.0);
    }
}
