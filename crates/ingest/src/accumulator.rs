//! Session event accumulator: folds one file's ordered event stream into
//! net token usage, reconciling the two upstream conventions (explicit
//! per-event deltas vs. cumulative running totals).

use chrono::{DateTime, Utc};
use serde_json::Value;
use usagebar_core::UsageTotals;

use crate::fields::{extract_model, extract_timestamp, find_string, find_u64};

#[derive(Debug, Default)]
pub struct SessionAccumulator {
    totals: UsageTotals,
    // Shadow of the last cumulative block seen, advanced by applied
    // deltas in between so mixed streams don't double-count.
    prev_cumulative: UsageTotals,
    model: Option<String>,
    session_id: Option<String>,
    latest_timestamp: Option<DateTime<Utc>>,
    has_usage: bool,
}

impl SessionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed log line into the accumulator. Never fails:
    /// irrelevant or malformed events are a no-op.
    pub fn process(&mut self, event: &Value) {
        let top_type = event.get("type").and_then(|value| value.as_str());

        if top_type == Some("session_meta") {
            if let Some(id) = find_string(
                event,
                &[
                    &["payload", "id"],
                    &["payload", "info", "id"],
                    &["payload", "session_id"],
                    &["session_id"],
                    &["id"],
                ],
            ) {
                self.session_id = Some(id.to_string());
            }
            // session_meta often names the model too.
            if let Some(model) = extract_model(event) {
                self.model = Some(model);
            }
            return;
        }

        let payload_type = event
            .get("payload")
            .and_then(|payload| payload.get("type"))
            .and_then(|value| value.as_str());

        // Context events overwrite the model; later ones win because the
        // model can change mid-session.
        if top_type == Some("turn_context") || payload_type == Some("turn_context") {
            if let Some(model) = extract_model(event) {
                self.model = Some(model);
            }
            return;
        }

        let is_usage_event = (top_type == Some("event_msg") && payload_type == Some("token_count"))
            || top_type == Some("token_count");
        if !is_usage_event {
            return;
        }
        let Some(info) = event
            .get("payload")
            .and_then(|payload| payload.get("info"))
            .or_else(|| event.get("info"))
        else {
            return;
        };
        if info.is_null() {
            return;
        }

        let delta_block = parse_usage_block(info.get("last_token_usage"));
        let cumulative = parse_usage_block(info.get("total_token_usage"));

        // A cumulative block is the true total up to this point, so it
        // resets the shadow even when an explicit delta is also present.
        let delta = match (delta_block, cumulative) {
            (Some(delta), _) => delta,
            (None, Some(cumulative)) => clamped_delta(cumulative, self.prev_cumulative),
            (None, None) => return,
        };
        if let Some(cumulative) = cumulative {
            self.prev_cumulative = cumulative;
        } else {
            self.prev_cumulative = add(self.prev_cumulative, delta);
        }

        // Heartbeat/duplicate events carry no change; drop them without
        // touching totals or the latest timestamp.
        if delta.is_zero() {
            return;
        }

        if self.model.is_none()
            && let Some(model) = extract_model(info).or_else(|| extract_model(event))
        {
            self.model = Some(model);
        }

        self.totals = add(self.totals, delta);
        self.has_usage = true;
        if let Some(ts) = extract_timestamp(event).or_else(|| extract_timestamp(info)) {
            self.latest_timestamp = Some(ts);
        }
    }

    pub fn has_usage(&self) -> bool {
        self.has_usage
    }

    pub fn totals(&self) -> UsageTotals {
        self.totals
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.latest_timestamp
    }
}

fn parse_usage_block(value: Option<&Value>) -> Option<UsageTotals> {
    let block = value?;
    if !block.is_object() {
        return None;
    }
    let input_tokens = find_u64(block, &[&["input_tokens"]]).unwrap_or(0);
    let cached_input_tokens = find_u64(
        block,
        &[&["cached_input_tokens"], &["cache_read_input_tokens"]],
    )
    .unwrap_or(0);
    let output_tokens = find_u64(block, &[&["output_tokens"]]).unwrap_or(0);
    let reasoning_output_tokens = find_u64(block, &[&["reasoning_output_tokens"]]).unwrap_or(0);
    let total_tokens = find_u64(block, &[&["total_tokens"]]).unwrap_or(0);
    // A declared total of zero means "not reported", not a true zero; a
    // token_count event that truly moved zero tokens would be meaningless.
    let total_tokens = if total_tokens > 0 {
        total_tokens
    } else {
        input_tokens.saturating_add(output_tokens)
    };
    Some(UsageTotals {
        input_tokens,
        cached_input_tokens,
        output_tokens,
        reasoning_output_tokens,
        total_tokens,
    })
}

// Per-field max(0, current - previous): clamping guards against upstream
// resets and out-of-order cumulative values.
fn clamped_delta(current: UsageTotals, previous: UsageTotals) -> UsageTotals {
    UsageTotals {
        input_tokens: current.input_tokens.saturating_sub(previous.input_tokens),
        cached_input_tokens: current
            .cached_input_tokens
            .saturating_sub(previous.cached_input_tokens),
        output_tokens: current.output_tokens.saturating_sub(previous.output_tokens),
        reasoning_output_tokens: current
            .reasoning_output_tokens
            .saturating_sub(previous.reasoning_output_tokens),
        total_tokens: current.total_tokens.saturating_sub(previous.total_tokens),
    }
}

fn add(a: UsageTotals, b: UsageTotals) -> UsageTotals {
    UsageTotals {
        input_tokens: a.input_tokens.saturating_add(b.input_tokens),
        cached_input_tokens: a.cached_input_tokens.saturating_add(b.cached_input_tokens),
        output_tokens: a.output_tokens.saturating_add(b.output_tokens),
        reasoning_output_tokens: a
            .reasoning_output_tokens
            .saturating_add(b.reasoning_output_tokens),
        total_tokens: a.total_tokens.saturating_add(b.total_tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::parse_json_line;

    fn feed(accumulator: &mut SessionAccumulator, lines: &[&str]) {
        for line in lines {
            let event = parse_json_line(line).expect("valid json");
            accumulator.process(&event);
        }
    }

    #[test]
    fn cumulative_events_yield_final_totals() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"timestamp":"2026-08-29T10:00:00.100Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":1000,"cached_input_tokens":800,"output_tokens":50,"reasoning_output_tokens":0,"total_tokens":1050}}}}"#,
                r#"{"timestamp":"2026-08-29T10:01:00.100Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":3000,"cached_input_tokens":2300,"output_tokens":150,"reasoning_output_tokens":0,"total_tokens":3150}}}}"#,
            ],
        );
        assert!(acc.has_usage());
        let totals = acc.totals();
        assert_eq!(totals.input_tokens, 3000);
        assert_eq!(totals.cached_input_tokens, 2300);
        assert_eq!(totals.output_tokens, 150);
    }

    #[test]
    fn delta_and_cumulative_streams_are_equivalent() {
        let mut deltas = SessionAccumulator::new();
        feed(
            &mut deltas,
            &[
                r#"{"timestamp":"2026-08-29T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":100,"cached_input_tokens":10,"output_tokens":20,"reasoning_output_tokens":5,"total_tokens":120}}}}"#,
                r#"{"timestamp":"2026-08-29T10:01:00Z","type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":200,"cached_input_tokens":30,"output_tokens":40,"reasoning_output_tokens":0,"total_tokens":240}}}}"#,
            ],
        );
        let mut cumulatives = SessionAccumulator::new();
        feed(
            &mut cumulatives,
            &[
                r#"{"timestamp":"2026-08-29T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":100,"cached_input_tokens":10,"output_tokens":20,"reasoning_output_tokens":5,"total_tokens":120}}}}"#,
                r#"{"timestamp":"2026-08-29T10:01:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":300,"cached_input_tokens":40,"output_tokens":60,"reasoning_output_tokens":5,"total_tokens":360}}}}"#,
            ],
        );
        assert_eq!(deltas.totals(), cumulatives.totals());
    }

    #[test]
    fn mixed_delta_then_cumulative_does_not_double_count() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"timestamp":"2026-08-29T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":500,"cached_input_tokens":400,"output_tokens":20,"total_tokens":520}}}}"#,
                r#"{"timestamp":"2026-08-29T10:01:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":1200,"cached_input_tokens":900,"output_tokens":70,"total_tokens":1270}}}}"#,
            ],
        );
        let totals = acc.totals();
        assert_eq!(totals.input_tokens, 1200);
        assert_eq!(totals.cached_input_tokens, 900);
        assert_eq!(totals.output_tokens, 70);
    }

    #[test]
    fn zero_delta_event_changes_nothing() {
        let line = r#"{"timestamp":"2026-08-29T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":100,"output_tokens":10,"total_tokens":110}}}}"#;
        let duplicate = r#"{"timestamp":"2026-08-29T11:59:59Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":100,"output_tokens":10,"total_tokens":110}}}}"#;
        let mut acc = SessionAccumulator::new();
        feed(&mut acc, &[line]);
        let before_totals = acc.totals();
        let before_ts = acc.latest_timestamp();
        feed(&mut acc, &[duplicate]);
        assert_eq!(acc.totals(), before_totals);
        assert_eq!(acc.latest_timestamp(), before_ts);
        assert!(acc.has_usage());
    }

    #[test]
    fn zero_declared_total_is_synthesized() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":10,"output_tokens":4,"total_tokens":0}}}}"#,
            ],
        );
        assert_eq!(acc.totals().total_tokens, 14);
    }

    #[test]
    fn null_info_is_a_no_op() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[r#"{"type":"event_msg","payload":{"type":"token_count","info":null}}"#],
        );
        assert!(!acc.has_usage());
        assert!(acc.latest_timestamp().is_none());
    }

    #[test]
    fn later_context_event_overrides_model() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"type":"turn_context","payload":{"model":"gpt-5-mini"}}"#,
                r#"{"type":"turn_context","payload":{"model":"gpt-5.2-codex"}}"#,
                r#"{"type":"event_msg","payload":{"type":"token_count","info":{"model":"ignored","last_token_usage":{"input_tokens":1,"output_tokens":1,"total_tokens":2}}}}"#,
            ],
        );
        assert_eq!(acc.model(), Some("gpt-5.2-codex"));
    }

    #[test]
    fn usage_event_model_fills_in_when_no_context_seen() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"type":"event_msg","payload":{"type":"token_count","info":{"model_name":"gpt-5-nano","last_token_usage":{"input_tokens":1,"output_tokens":1,"total_tokens":2}}}}"#,
            ],
        );
        assert_eq!(acc.model(), Some("gpt-5-nano"));
    }

    #[test]
    fn session_meta_captures_session_id() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[r#"{"type":"session_meta","payload":{"info":{"id":"abc-123","model":"gpt-5"}}}"#],
        );
        assert_eq!(acc.session_id(), Some("abc-123"));
        assert_eq!(acc.model(), Some("gpt-5"));
    }

    #[test]
    fn unparseable_timestamp_keeps_previous() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"timestamp":"2026-08-29T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":1,"output_tokens":1,"total_tokens":2}}}}"#,
                r#"{"timestamp":"not a time","type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":1,"output_tokens":1,"total_tokens":2}}}}"#,
            ],
        );
        let ts = acc.latest_timestamp().expect("timestamp");
        let expected = crate::fields::normalize_timestamp("2026-08-29T10:00:00Z").expect("parse");
        assert_eq!(ts, expected);
        assert_eq!(acc.totals().input_tokens, 2);
    }

    #[test]
    fn cumulative_reset_is_clamped_not_negative() {
        let mut acc = SessionAccumulator::new();
        feed(
            &mut acc,
            &[
                r#"{"type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":100,"output_tokens":10,"total_tokens":110}}}}"#,
                r#"{"type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":40,"output_tokens":4,"total_tokens":44}}}}"#,
                r#"{"type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":60,"output_tokens":6,"total_tokens":66}}}}"#,
            ],
        );
        // Reset to 40/4 contributes nothing; growth 40->60 counts.
        let totals = acc.totals();
        assert_eq!(totals.input_tokens, 120);
        assert_eq!(totals.output_tokens, 12);
    }
}
