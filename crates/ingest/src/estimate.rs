//! Character-count token estimation for the daily/heatmap path. This is
//! a deliberately crude chars/4 approximation used where structured
//! token_count events are absent; never treat it as authoritative.

use serde_json::Value;

/// Estimate tokens for one log entry: total character length of all
/// textual content reachable under `message.content` / `content` /
/// `text`, divided by 4 (floored), minimum 1 if any text was found.
pub fn estimate_tokens(entry: &Value) -> u64 {
    let mut chars = 0u64;
    if let Some(message) = entry.get("message") {
        chars = chars.saturating_add(content_chars(message));
    }
    if let Some(content) = entry.get("content") {
        chars = chars.saturating_add(text_chars(content));
    }
    if let Some(text) = entry.get("text").and_then(|value| value.as_str()) {
        chars = chars.saturating_add(text.chars().count() as u64);
    }
    if chars == 0 {
        return 0;
    }
    (chars / 4).max(1)
}

fn content_chars(message: &Value) -> u64 {
    message.get("content").map(text_chars).unwrap_or(0)
}

// Recurses through arrays and nested content/text keys; anything else
// contributes nothing.
fn text_chars(value: &Value) -> u64 {
    match value {
        Value::String(text) => text.chars().count() as u64,
        Value::Array(items) => items
            .iter()
            .fold(0u64, |sum, item| sum.saturating_add(text_chars(item))),
        Value::Object(map) => {
            let mut sum = 0u64;
            if let Some(text) = map.get("text") {
                sum = sum.saturating_add(text_chars(text));
            }
            if let Some(content) = map.get("content") {
                sum = sum.saturating_add(text_chars(content));
            }
            sum
        }
        _ => 0,
    }
}
