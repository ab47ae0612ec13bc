//! Tolerant field lookup over untyped log lines. The producing CLIs
//! drift their schemas between releases, so every accessor here tries a
//! list of alias paths, coerces loosely, and returns `None` rather than
//! failing when nothing matches.

use chrono::{DateTime, Utc};
use serde_json::Value;

pub(crate) fn parse_json_line(line: &str) -> Option<Value> {
    serde_json::from_str(line).ok()
}

pub(crate) fn find_value<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    for path in paths {
        let mut current = value;
        let mut ok = true;
        for key in *path {
            if let Some(next) = current.get(*key) {
                current = next;
            } else {
                ok = false;
                break;
            }
        }
        if ok && !current.is_null() {
            return Some(current);
        }
    }
    None
}

pub(crate) fn find_string<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    find_value(value, paths).and_then(|found| found.as_str())
}

/// Integer lookup with loose coercion: u64, non-negative i64, whole f64,
/// or a numeric string all count.
pub(crate) fn find_u64(value: &Value, paths: &[&[&str]]) -> Option<u64> {
    find_value(value, paths).and_then(coerce_u64)
}

pub(crate) fn coerce_u64(value: &Value) -> Option<u64> {
    if let Some(number) = value.as_u64() {
        return Some(number);
    }
    if let Some(number) = value.as_i64() {
        return u64::try_from(number).ok();
    }
    if let Some(number) = value.as_f64() {
        if number.is_finite() && number >= 0.0 {
            return Some(number as u64);
        }
        return None;
    }
    value.as_str().and_then(|text| text.parse::<u64>().ok())
}

/// Parse a timestamp in any of the encodings the logs use: RFC3339 with
/// or without fractional seconds, bare ISO-8601 without an offset, or
/// epoch seconds/milliseconds.
pub(crate) fn normalize_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc));
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc));
    }
    if raw.chars().all(|ch| ch.is_ascii_digit())
        && let Ok(value) = raw.parse::<i64>()
    {
        return epoch_to_datetime(value, raw.len() > 10);
    }
    None
}

fn epoch_to_datetime(value: i64, millis: bool) -> Option<DateTime<Utc>> {
    let (secs, nanos) = if millis {
        (
            value / 1000,
            (value % 1000).unsigned_abs() as u32 * 1_000_000,
        )
    } else {
        (value, 0)
    };
    DateTime::<Utc>::from_timestamp(secs, nanos)
}

/// Timestamp off a whole event, under the usual key aliases. Numeric
/// values are treated as epoch seconds or milliseconds by magnitude.
pub(crate) fn extract_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = find_value(value, &[&["timestamp"], &["ts"], &["time"]])?;
    if let Some(text) = raw.as_str() {
        return normalize_timestamp(text);
    }
    let number = raw.as_i64()?;
    epoch_to_datetime(number, number > 10_000_000_000)
}

/// Model name off an event, at increasing nesting specificity.
pub(crate) fn extract_model(value: &Value) -> Option<String> {
    find_string(
        value,
        &[
            &["model"],
            &["model_name"],
            &["metadata", "model"],
            &["payload", "model"],
            &["payload", "info", "model"],
            &["payload", "info", "model_name"],
            &["message", "model"],
        ],
    )
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_first_matching_alias() {
        let value = json!({"payload": {"info": {"model_name": "gpt-5"}}});
        assert_eq!(extract_model(&value).as_deref(), Some("gpt-5"));
        let value = json!({"model": "opus", "payload": {"model": "shadowed"}});
        assert_eq!(extract_model(&value).as_deref(), Some("opus"));
    }

    #[test]
    fn coerces_numbers_loosely() {
        assert_eq!(coerce_u64(&json!(12)), Some(12));
        assert_eq!(coerce_u64(&json!(12.0)), Some(12));
        assert_eq!(coerce_u64(&json!("12")), Some(12));
        assert_eq!(coerce_u64(&json!(-5)), None);
        assert_eq!(coerce_u64(&json!("twelve")), None);
    }

    #[test]
    fn parses_fractional_and_plain_timestamps() {
        let fractional = normalize_timestamp("2026-08-30T10:00:00.123Z").expect("fractional");
        assert_eq!(fractional.timestamp_subsec_millis(), 123);
        let plain = normalize_timestamp("2026-08-30T10:00:00").expect("plain");
        assert_eq!(plain.timestamp(), fractional.timestamp());
    }

    #[test]
    fn parses_epoch_seconds_and_millis() {
        let seconds = extract_timestamp(&json!({"ts": "1756540800"})).expect("seconds");
        let millis = extract_timestamp(&json!({"ts": 1756540800123i64})).expect("millis");
        assert_eq!(seconds.timestamp(), millis.timestamp());
    }

    #[test]
    fn unparseable_timestamp_is_none() {
        assert!(extract_timestamp(&json!({"timestamp": "yesterday"})).is_none());
        assert!(extract_timestamp(&json!({"other": 1})).is_none());
    }
}
