//! Container resource usage as reported by `docker stats`.
//!
//! `docker stats --no-stream --format '{{json .}}'` prints one JSON object per
//! container with human-formatted values:
//!
//! ```json
//! {"BlockIO":"1.2MB / 0B","CPUPerc":"12.50%","MemPerc":"3.10%",
//!  "MemUsage":"245.3MiB / 7.66GiB","Name":"stt-service","NetIO":"1.1kB / 0B","PIDs":"23"}
//! ```
//!
//! The raw strings are kept for display; numeric fields are parsed where
//! possible and left as `None` otherwise.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// CPU usage percentage (can exceed 100 on multi-core hosts).
    pub cpu_percent: Option<f64>,
    pub memory_usage_bytes: Option<u64>,
    pub memory_limit_bytes: Option<u64>,
    pub memory_percent: Option<f64>,
    /// `rx / tx` as printed by the runtime.
    pub net_io: String,
    /// `read / write` as printed by the runtime.
    pub block_io: String,
    pub pids: Option<u64>,
    /// `usage / limit` as printed by the runtime.
    pub memory_display: String,
}

#[derive(Deserialize)]
struct RawStats {
    #[serde(rename = "CPUPerc", default)]
    cpu_perc: String,
    #[serde(rename = "MemUsage", default)]
    mem_usage: String,
    #[serde(rename = "MemPerc", default)]
    mem_perc: String,
    #[serde(rename = "NetIO", default)]
    net_io: String,
    #[serde(rename = "BlockIO", default)]
    block_io: String,
    #[serde(rename = "PIDs", default)]
    pids: String,
}

impl ResourceSnapshot {
    /// Parse one line of `docker stats --format '{{json .}}'` output.
    pub fn from_stats_json(line: &str) -> Result<Self, serde_json::Error> {
        let raw: RawStats = serde_json::from_str(line.trim())?;
        let (usage, limit) = split_pair(&raw.mem_usage);

        Ok(Self {
            cpu_percent: parse_percent(&raw.cpu_perc),
            memory_usage_bytes: usage.and_then(parse_size),
            memory_limit_bytes: limit.and_then(parse_size),
            memory_percent: parse_percent(&raw.mem_perc),
            net_io: raw.net_io,
            block_io: raw.block_io,
            pids: raw.pids.trim().parse().ok(),
            memory_display: raw.mem_usage,
        })
    }
}

fn split_pair(s: &str) -> (Option<&str>, Option<&str>) {
    let mut parts = s.splitn(2, '/').map(str::trim);
    (parts.next(), parts.next())
}

fn parse_percent(s: &str) -> Option<f64> {
    s.trim().trim_end_matches('%').parse().ok()
}

/// Parse a docker size string like `245.3MiB`, `1.2MB`, `0B`.
pub fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number.parse().ok()?;

    let multiplier: f64 = match unit.trim() {
        "" | "B" => 1.0,
        "kB" | "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((value * multiplier).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_line() {
        let line = r#"{"BlockIO":"1.2MB / 0B","CPUPerc":"12.50%","Container":"abc","ID":"abc","MemPerc":"3.10%","MemUsage":"256MiB / 8GiB","Name":"stt-service","NetIO":"1.1kB / 0B","PIDs":"23"}"#;
        let snap = ResourceSnapshot::from_stats_json(line).unwrap();

        assert_eq!(snap.cpu_percent, Some(12.5));
        assert_eq!(snap.memory_percent, Some(3.1));
        assert_eq!(snap.memory_usage_bytes, Some(256 * 1024 * 1024));
        assert_eq!(snap.memory_limit_bytes, Some(8 * 1024 * 1024 * 1024));
        assert_eq!(snap.pids, Some(23));
        assert_eq!(snap.net_io, "1.1kB / 0B");
        assert_eq!(snap.memory_display, "256MiB / 8GiB");
    }

    #[test]
    fn test_unparseable_fields_degrade_to_none() {
        let line = r#"{"CPUPerc":"--","MemUsage":"-- / --","MemPerc":"--","PIDs":"--"}"#;
        let snap = ResourceSnapshot::from_stats_json(line).unwrap();
        assert_eq!(snap.cpu_percent, None);
        assert_eq!(snap.memory_usage_bytes, None);
        assert_eq!(snap.pids, None);
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("0B"), Some(0));
        assert_eq!(parse_size("1.5kB"), Some(1500));
        assert_eq!(parse_size("2KiB"), Some(2048));
        assert_eq!(parse_size("1GB"), Some(1_000_000_000));
        assert_eq!(parse_size("lots"), None);
    }
}
