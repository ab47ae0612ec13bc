//! Shared log-root walking: recursive `.jsonl` discovery, per-file
//! failure isolation, and the two-month retention window applied before
//! monthly aggregation.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, Utc};
use serde::Serialize;
use serde_json::Value;
use usagebar_core::MonthlyUsageSample;
use walkdir::WalkDir;

use crate::fields::parse_json_line;

/// Non-fatal problem hit while scanning; one corrupt file never aborts
/// the rest of the scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanIssue {
    pub file_path: String,
    pub message: String,
}

/// Counters and issues for one provider-wide scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub issues: Vec<ScanIssue>,
}

impl ScanStats {
    pub fn had_read_error(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Outcome of one provider usage scan. `root_found` distinguishes "no
/// data yet" (missing log root) from an empty-but-present root.
#[derive(Debug, Clone, Default)]
pub struct UsageScan {
    pub root_found: bool,
    pub samples: Vec<MonthlyUsageSample>,
    pub stats: ScanStats,
}

/// Enumerate `.jsonl` files under `root`, recursively. Unreadable
/// directory entries become issues; other extensions count as skipped.
pub(crate) fn jsonl_files(root: &Path, stats: &mut ScanStats) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let file_path = err
                    .path()
                    .map(|path| path.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                stats.issues.push(ScanIssue {
                    file_path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|value| value.to_str()) != Some("jsonl") {
            stats.files_skipped += 1;
            continue;
        }
        files.push(path.to_path_buf());
    }
    files
}

/// Stream a file line by line, invoking `handler` for every line that
/// parses as JSON. Per-line parse failures are skipped silently: the
/// logs are append-only and a truncated tail line is expected while the
/// producing CLI is mid-write. A read error stops the file and is
/// returned; lines handled before it stand.
pub(crate) fn for_each_event(
    path: &Path,
    mut handler: impl FnMut(&Value),
) -> Result<(), io::Error> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            continue;
        }
        let Some(event) = parse_json_line(line) else {
            continue;
        };
        handler(&event);
    }
    Ok(())
}

/// "YYYY-MM" key for a timestamp, in the local timezone.
pub(crate) fn month_key(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m").to_string()
}

/// "YYYY-MM-DD" key for a timestamp, in the local timezone.
pub(crate) fn date_key(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// The fixed retention window for monthly samples: current month plus
/// the previous one. Samples outside it are dropped before aggregation,
/// bounding memory and output size regardless of log history depth.
/// Deliberate policy carried from the source tool: sessions that slip
/// past the window (clock changes, a scan delayed across a month
/// boundary) are never counted.
pub(crate) fn month_window(now: DateTime<Local>) -> [String; 2] {
    let current = now.format("%Y-%m").to_string();
    let (prev_year, prev_month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    let previous = format!("{prev_year:04}-{prev_month:02}");
    [current, previous]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn month_window_handles_january_rollover() {
        let january = Local.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(month_window(january), ["2026-01", "2025-12"]);
        let august = Local.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        assert_eq!(month_window(august), ["2026-08", "2026-07"]);
    }

    #[test]
    fn jsonl_files_skips_other_extensions() {
        let dir = tempdir().expect("temp dir");
        let nested = dir.path().join("2026/08");
        fs::create_dir_all(&nested).expect("create dirs");
        fs::write(nested.join("a.jsonl"), "{}\n").expect("write");
        fs::write(nested.join("b.txt"), "not a log\n").expect("write");
        let mut stats = ScanStats::default();
        let files = jsonl_files(dir.path(), &mut stats);
        assert_eq!(files.len(), 1);
        assert_eq!(stats.files_skipped, 1);
        assert!(!stats.had_read_error());
    }

    #[test]
    fn for_each_event_skips_corrupt_lines() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("log.jsonl");
        fs::write(&path, "{\"ok\":1}\nnot json\n{\"ok\":2}\n{\"trunc").expect("write");
        let mut seen = 0;
        for_each_event(&path, |_| seen += 1).expect("read");
        assert_eq!(seen, 2);
    }
}
