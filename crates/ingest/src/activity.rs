//! Provider-spanning daily activity scan for the heatmap history. This
//! path uses the chars/4 estimator rather than priced usage events and
//! is not month-windowed; retention is handled by the history merge.

use std::path::Path;

use usagebar_core::Provider;
use usagebar_core::daily::DayActivity;

use crate::estimate::estimate_tokens;
use crate::fields::extract_timestamp;
use crate::scan::{ScanIssue, ScanStats, date_key, for_each_event, jsonl_files};

/// Outcome of one daily activity scan across both providers.
#[derive(Debug, Clone, Default)]
pub struct ActivityScan {
    pub claude_root_found: bool,
    pub codex_root_found: bool,
    pub entries: Vec<DayActivity>,
    pub stats: ScanStats,
}

impl ActivityScan {
    pub fn any_root_found(&self) -> bool {
        self.claude_root_found || self.codex_root_found
    }
}

/// Walk both log roots and estimate tokens per (date, provider). A
/// missing root is "no data" for that provider, not an error.
pub fn scan_daily_activity(claude_root: &Path, codex_root: &Path) -> ActivityScan {
    let mut entries = Vec::new();
    let mut stats = ScanStats::default();
    let claude_root_found = scan_root(claude_root, Provider::Claude, &mut entries, &mut stats);
    let codex_root_found = scan_root(codex_root, Provider::Codex, &mut entries, &mut stats);
    ActivityScan {
        claude_root_found,
        codex_root_found,
        entries,
        stats,
    }
}

fn scan_root(
    root: &Path,
    provider: Provider,
    entries: &mut Vec<DayActivity>,
    stats: &mut ScanStats,
) -> bool {
    if !root.is_dir() {
        return false;
    }
    for path in jsonl_files(root, stats) {
        stats.files_scanned += 1;
        let result = for_each_event(&path, |event| {
            let Some(ts) = extract_timestamp(event) else {
                return;
            };
            let tokens = estimate_tokens(event);
            if tokens == 0 {
                return;
            }
            entries.push(DayActivity {
                date: date_key(ts),
                provider,
                tokens,
            });
        });
        if let Err(err) = result {
            stats.issues.push(ScanIssue {
                file_path: path.to_string_lossy().to_string(),
                message: err.to_string(),
            });
        }
    }
    true
}
