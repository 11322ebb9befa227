use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Space used by one data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskUsage {
    Bytes(u64),
    Unknown(String),
}

impl DiskUsage {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            DiskUsage::Bytes(b) => Some(*b),
            DiskUsage::Unknown(_) => None,
        }
    }
}

/// Measure `dir` as the sum of the sizes of the regular files under it.
///
/// The root itself may be a symlink to a directory. Symlinks below it are
/// never followed. A missing or unreadable root is `Unknown`; unreadable
/// entries below it are skipped.
pub fn measure(dir: &Path) -> DiskUsage {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return DiskUsage::Unknown("not a directory".to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return DiskUsage::Unknown("does not exist".to_string())
        }
        Err(e) => return DiskUsage::Unknown(e.to_string()),
    }

    let mut total = 0u64;
    let mut pending: Vec<PathBuf> = vec![dir.to_path_buf()];
    let mut root = true;

    while let Some(current) = pending.pop() {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) if root => return DiskUsage::Unknown(e.to_string()),
            Err(e) => {
                tracing::debug!("Skipping unreadable {}: {}", current.display(), e);
                continue;
            }
        };
        root = false;

        for entry in entries.flatten() {
            // DirEntry::metadata does not traverse symlinks.
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if meta.is_dir() {
                pending.push(entry.path());
            } else if meta.is_file() {
                total = total.saturating_add(meta.len());
            }
        }
    }

    DiskUsage::Bytes(total)
}

/// Render a byte count the way `du -h` does (`0B`, `12K`, `3.4G`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", bytes)
    } else if value < 10.0 {
        format!("{:.1}{}", value, UNITS[unit])
    } else {
        format!("{:.0}{}", value, UNITS[unit])
    }
}
