//! Bounded, most-recent views of the worker's logs and event stream.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_LOG_TAIL: i64 = 200;
pub const DEFAULT_EVENT_TAIL: i64 = 50;

/// Last `count` lines of the file at `path`. Unreadable files and
/// non-positive counts give an empty list.
pub fn tail_lines(path: &Path, count: i64) -> Vec<String> {
    if count <= 0 {
        return Vec::new();
    }
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(count as usize);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

/// Last `count` lines of an NDJSON stream, parsed. Lines that are not valid
/// JSON are dropped; the order of the rest is kept.
pub fn read_events(path: &Path, count: i64) -> Vec<Value> {
    tail_lines(path, count)
        .iter()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Metadata of the most recently modified `*.log` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogFile {
    pub name: String,
    /// Seconds since the Unix epoch
    pub modified: f64,
    pub size: u64,
    #[serde(skip)]
    pub path: PathBuf,
}

pub fn latest_log(logs_dir: &Path) -> Option<LogFile> {
    let pattern = logs_dir.join("*.log");
    let pattern = pattern.to_str()?;
    glob::glob(pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|path| {
            let meta = std::fs::metadata(&path).ok()?;
            if !meta.is_file() {
                return None;
            }
            let modified = meta
                .modified()
                .ok()?
                .duration_since(std::time::UNIX_EPOCH)
                .ok()?
                .as_secs_f64();
            Some(LogFile {
                name: path.file_name()?.to_string_lossy().into_owned(),
                modified,
                size: meta.len(),
                path,
            })
        })
        .max_by(|a, b| a.modified.total_cmp(&b.modified))
}

/// Response body for a log tail request.
#[derive(Debug, Clone, Serialize)]
pub struct LogTail {
    pub file: Option<String>,
    pub modified: Option<f64>,
    pub size: Option<u64>,
    pub tail: i64,
    pub lines: Vec<String>,
}

pub fn read_log_tail(logs_dir: &Path, tail: i64) -> LogTail {
    match latest_log(logs_dir) {
        Some(log) => LogTail {
            lines: tail_lines(&log.path, tail),
            file: Some(log.name),
            modified: Some(log.modified),
            size: Some(log.size),
            tail,
        },
        None => LogTail {
            file: None,
            modified: None,
            size: None,
            tail,
            lines: Vec::new(),
        },
    }
}
