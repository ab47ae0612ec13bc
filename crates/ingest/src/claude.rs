//! Claude usage scan: assistant messages carry per-event usage deltas,
//! deduplicated by request/message id across overlapping project files.

use std::path::Path;

use chrono::Local;
use serde_json::Value;
use usagebar_core::pricing::{calculate_cost, rate_card};
use usagebar_core::{MonthlyUsageSample, Provider};

use crate::dedup::{DedupLedger, extract_key};
use crate::fields::{extract_timestamp, find_string, find_u64};
use crate::scan::{ScanIssue, UsageScan, for_each_event, jsonl_files, month_key, month_window};

/// Scan a Claude projects root into priced monthly samples, one per
/// deduplicated assistant message in the current or previous month.
pub fn scan_claude_usage(root: &Path) -> UsageScan {
    let mut scan = UsageScan::default();
    if !root.is_dir() {
        return scan;
    }
    scan.root_found = true;

    let window = month_window(Local::now());
    let mut ledger = DedupLedger::new();
    for path in jsonl_files(root, &mut scan.stats) {
        scan.stats.files_scanned += 1;
        // Samples stay pending until the whole file reads cleanly; a
        // mid-stream read failure excludes the file, same as the codex
        // path.
        let mut pending = Vec::new();
        let result = for_each_event(&path, |event| {
            if let Some(sample) = sample_from_event(event, &window) {
                pending.push((sample, extract_key(event)));
            }
        });
        match result {
            Ok(()) => {
                for (sample, key) in pending {
                    if let Some(sample) = ledger.accept(Some(sample), key.as_deref()) {
                        scan.samples.push(sample);
                    }
                }
            }
            Err(err) => {
                scan.stats.issues.push(ScanIssue {
                    file_path: path.to_string_lossy().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
    scan
}

fn sample_from_event(event: &Value, window: &[String; 2]) -> Option<MonthlyUsageSample> {
    if event.get("type").and_then(|value| value.as_str()) != Some("assistant") {
        return None;
    }
    let usage = event.get("message")?.get("usage")?;
    let month = month_key(extract_timestamp(event)?);
    if !window.contains(&month) {
        return None;
    }
    let model = find_string(event, &[&["message", "model"], &["model"]])?.to_string();

    let input_tokens = find_u64(usage, &[&["input_tokens"]]).unwrap_or(0);
    let output_tokens = find_u64(usage, &[&["output_tokens"]]).unwrap_or(0);
    let cache_creation_tokens = find_u64(usage, &[&["cache_creation_input_tokens"]]).unwrap_or(0);
    let cache_read_tokens = find_u64(usage, &[&["cache_read_input_tokens"]]).unwrap_or(0);
    if input_tokens == 0 && output_tokens == 0 && cache_creation_tokens == 0 && cache_read_tokens == 0
    {
        return None;
    }

    // Claude's input_tokens field already excludes cache tokens, so no
    // subset correction applies on this path.
    let cost_usd = calculate_cost(
        rate_card(Provider::Claude, &model),
        input_tokens,
        output_tokens,
        cache_creation_tokens,
        cache_read_tokens,
    );
    Some(MonthlyUsageSample {
        month,
        model,
        input_tokens,
        output_tokens,
        cache_creation_tokens,
        cache_read_tokens,
        cost_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::parse_json_line;
    use chrono::{Datelike, Utc};

    fn current_window() -> [String; 2] {
        month_window(Local::now())
    }

    fn assistant_line(ts: &str, request_id: &str) -> String {
        format!(
            r#"{{"type":"assistant","timestamp":"{ts}","requestId":"{request_id}","message":{{"model":"claude-sonnet-4-5","usage":{{"input_tokens":120,"output_tokens":30,"cache_creation_input_tokens":10,"cache_read_input_tokens":400}}}}}}"#
        )
    }

    #[test]
    fn assistant_event_becomes_priced_sample() {
        let now = Utc::now();
        let line = assistant_line(&now.to_rfc3339(), "req-1");
        let event = parse_json_line(&line).expect("json");
        let sample = sample_from_event(&event, &current_window()).expect("sample");
        assert_eq!(sample.model, "claude-sonnet-4-5");
        assert_eq!(sample.input_tokens, 120);
        assert_eq!(sample.cache_read_tokens, 400);
        assert!(sample.cost_usd > 0.0);
    }

    #[test]
    fn events_outside_month_window_are_dropped() {
        let stale = Utc::now()
            .with_year(2020)
            .expect("year")
            .to_rfc3339();
        let line = assistant_line(&stale, "req-1");
        let event = parse_json_line(&line).expect("json");
        assert!(sample_from_event(&event, &current_window()).is_none());
    }

    #[test]
    fn non_assistant_lines_are_ignored() {
        let event = parse_json_line(r#"{"type":"summary","summary":"chat"}"#).expect("json");
        assert!(sample_from_event(&event, &current_window()).is_none());
    }

    #[test]
    fn all_zero_usage_is_ignored() {
        let line = r#"{"type":"assistant","timestamp":"2026-08-29T10:00:00Z","message":{"model":"claude-sonnet-4-5","usage":{"input_tokens":0,"output_tokens":0}}}"#;
        let event = parse_json_line(line).expect("json");
        assert!(sample_from_event(&event, &["2026-08".into(), "2026-07".into()]).is_none());
    }
}
