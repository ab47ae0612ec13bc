//! Cross-file identity resolution: a logical record contributes usage at
//! most once per scan, even when the same request lands in two files.

use std::collections::HashSet;

use serde_json::Value;

use crate::fields::find_string;

/// Stable identity for a record, tried in priority order. `None` means
/// "cannot determine identity, do not suppress".
pub fn extract_key(record: &Value) -> Option<String> {
    find_string(
        record,
        &[
            &["requestId"],
            &["request_id"],
            &["message", "id"],
            &["response", "id"],
            &["uuid"],
        ],
    )
    .map(str::to_string)
}

/// Seen-key set scoped to one provider-wide scan. Not persisted; every
/// scan recomputes it from scratch.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `sample` unless its key was already seen. An absent sample
    /// short-circuits without touching the ledger; an absent key always
    /// admits; a repeated key suppresses without mutating the set.
    pub fn accept<T>(&mut self, sample: Option<T>, key: Option<&str>) -> Option<T> {
        let sample = sample?;
        match key {
            Some(key) if self.seen.contains(key) => None,
            Some(key) => {
                self.seen.insert(key.to_string());
                Some(sample)
            }
            None => Some(sample),
        }
    }
}
