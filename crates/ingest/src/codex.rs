//! Codex usage scan: one accumulator per rollout file, session-level
//! dedup, and the cache-read subset correction for OpenAI accounting.

use std::path::Path;

use chrono::Local;
use usagebar_core::pricing::{calculate_cost, rate_card};
use usagebar_core::{MonthlyUsageSample, Provider};

use crate::accumulator::SessionAccumulator;
use crate::dedup::DedupLedger;
use crate::scan::{ScanIssue, UsageScan, for_each_event, jsonl_files, month_key, month_window};

// The dominant family for this CLI; a session with usage but no model
// must still be counted.
const FALLBACK_MODEL: &str = "gpt-5";

/// Scan a Codex sessions root into priced monthly samples, one per
/// session file, keeping only the current and previous month.
pub fn scan_codex_usage(root: &Path) -> UsageScan {
    let mut scan = UsageScan::default();
    if !root.is_dir() {
        return scan;
    }
    scan.root_found = true;

    let window = month_window(Local::now());
    let mut ledger = DedupLedger::new();
    for path in jsonl_files(root, &mut scan.stats) {
        scan.stats.files_scanned += 1;
        let mut accumulator = SessionAccumulator::new();
        if let Err(err) = for_each_event(&path, |event| accumulator.process(event)) {
            scan.stats.issues.push(ScanIssue {
                file_path: path.to_string_lossy().to_string(),
                message: err.to_string(),
            });
            continue;
        }
        let key = accumulator
            .session_id()
            .map(str::to_string)
            .or_else(|| session_key_from_path(&path));
        let sample = sample_from_session(&accumulator, &window);
        if let Some(sample) = ledger.accept(sample, key.as_deref()) {
            scan.samples.push(sample);
        }
    }
    scan
}

fn sample_from_session(
    accumulator: &SessionAccumulator,
    window: &[String; 2],
) -> Option<MonthlyUsageSample> {
    if !accumulator.has_usage() {
        return None;
    }
    let month = month_key(accumulator.latest_timestamp()?);
    if !window.contains(&month) {
        return None;
    }
    let totals = accumulator.totals();
    let model = accumulator
        .model()
        .unwrap_or(FALLBACK_MODEL)
        .to_string();

    // Codex reports cache-read tokens as a subset of input_tokens;
    // subtract before pricing so they are not billed at both rates.
    let cache_read_tokens = totals.cached_input_tokens;
    let input_tokens = totals.input_tokens.saturating_sub(cache_read_tokens);
    let cost_usd = calculate_cost(
        rate_card(Provider::Codex, &model),
        input_tokens,
        totals.output_tokens,
        0,
        cache_read_tokens,
    );
    Some(MonthlyUsageSample {
        month,
        model,
        input_tokens,
        output_tokens: totals.output_tokens,
        cache_creation_tokens: 0,
        cache_read_tokens,
        cost_usd,
    })
}

// Rollout files are named rollout-<timestamp>-<uuid>.jsonl; the uuid
// identifies the session when no session_meta event was seen, so a file
// is credited once per scan. Anything that does not end in a uuid keys
// on the whole stem: trailing timestamp segments are not unique across
// files and must never collapse distinct sessions.
fn session_key_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if let Some(rest) = stem.strip_prefix("rollout-")
        && rest.len() > UUID_LEN
        && rest.as_bytes()[rest.len() - UUID_LEN - 1] == b'-'
        && let Some(tail) = rest.get(rest.len() - UUID_LEN..)
        && looks_like_uuid(tail)
    {
        return Some(tail.to_string());
    }
    Some(stem.to_string())
}

const UUID_LEN: usize = 36;

fn looks_like_uuid(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == UUID_LEN
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            8 | 13 | 18 | 23 => *byte == b'-',
            _ => byte.is_ascii_hexdigit(),
        })
}
