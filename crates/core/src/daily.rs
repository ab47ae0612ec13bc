use std::collections::BTreeMap;

use crate::{DailyUsage, Provider};

/// Rolling-history horizon for the heatmap ledger.
pub const HISTORY_RETENTION_DAYS: usize = 90;

/// One raw estimated-token observation: a local "YYYY-MM-DD" date plus
/// the provider whose log it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayActivity {
    pub date: String,
    pub provider: Provider,
    pub tokens: u64,
}

/// Group raw activity by calendar date, summing per provider. Result is
/// sorted descending by date, at most one entry per date.
pub fn aggregate(entries: &[DayActivity]) -> Vec<DailyUsage> {
    let mut days: BTreeMap<String, DailyUsage> = BTreeMap::new();
    for entry in entries {
        let day = days.entry(entry.date.clone()).or_insert_with(|| DailyUsage {
            date: entry.date.clone(),
            claude_tokens: 0,
            codex_tokens: 0,
        });
        match entry.provider {
            Provider::Claude => {
                day.claude_tokens = day.claude_tokens.saturating_add(entry.tokens);
            }
            Provider::Codex => {
                day.codex_tokens = day.codex_tokens.saturating_add(entry.tokens);
            }
        }
    }
    let mut aggregated: Vec<DailyUsage> = days.into_values().collect();
    aggregated.sort_by(|a, b| b.date.cmp(&a.date));
    aggregated
}

/// Merge freshly aggregated days into the persisted history. A new entry
/// fully replaces the existing entry for the same date (a rescan of the
/// same period must not double the day's count); dates outside the new
/// set are preserved. The result is sorted descending by date and
/// truncated to the retention window. Merging the same new set twice is
/// idempotent.
pub fn merge(new: &[DailyUsage], existing: &[DailyUsage]) -> Vec<DailyUsage> {
    let mut by_date: BTreeMap<String, DailyUsage> = existing
        .iter()
        .map(|entry| (entry.date.clone(), entry.clone()))
        .collect();
    for entry in new {
        by_date.insert(entry.date.clone(), entry.clone());
    }
    let mut merged: Vec<DailyUsage> = by_date.into_values().collect();
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged.truncate(HISTORY_RETENTION_DAYS);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, claude: u64, codex: u64) -> DailyUsage {
        DailyUsage {
            date: date.to_string(),
            claude_tokens: claude,
            codex_tokens: codex,
        }
    }

    #[test]
    fn aggregate_groups_by_date_and_provider() {
        let entries = vec![
            DayActivity {
                date: "2026-08-29".to_string(),
                provider: Provider::Claude,
                tokens: 100,
            },
            DayActivity {
                date: "2026-08-29".to_string(),
                provider: Provider::Codex,
                tokens: 40,
            },
            DayActivity {
                date: "2026-08-29".to_string(),
                provider: Provider::Claude,
                tokens: 50,
            },
            DayActivity {
                date: "2026-08-30".to_string(),
                provider: Provider::Codex,
                tokens: 7,
            },
        ];
        let days = aggregate(&entries);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2026-08-30");
        assert_eq!(days[0].codex_tokens, 7);
        assert_eq!(days[1].date, "2026-08-29");
        assert_eq!(days[1].claude_tokens, 150);
        assert_eq!(days[1].codex_tokens, 40);
        assert_eq!(days[1].total_tokens(), 190);
    }

    #[test]
    fn merge_replaces_same_date_instead_of_adding() {
        let existing = vec![day("2026-08-29", 100, 0), day("2026-08-28", 50, 20)];
        let new = vec![day("2026-08-29", 120, 10)];
        let merged = merge(&new, &existing);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], day("2026-08-29", 120, 10));
        assert_eq!(merged[1], day("2026-08-28", 50, 20));
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = vec![day("2026-08-01", 5, 5), day("2026-07-15", 9, 0)];
        let new = vec![day("2026-08-01", 7, 3), day("2026-08-02", 1, 1)];
        let once = merge(&new, &existing);
        let twice = merge(&new, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_preserves_dates_outside_new_range() {
        let existing = vec![day("2026-05-01", 11, 0)];
        let new = vec![day("2026-08-30", 2, 2)];
        let merged = merge(&new, &existing);
        assert!(merged.iter().any(|entry| entry.date == "2026-05-01"));
    }

    #[test]
    fn merge_caps_history_at_retention_window() {
        let unique_dates: Vec<DailyUsage> = (0..95)
            .map(|offset| {
                day(
                    &format!("2026-{:02}-{:02}", 1 + offset / 28, 1 + offset % 28),
                    offset as u64,
                    0,
                )
            })
            .collect();
        let merged = merge(&[day("2026-08-30", 1, 1)], &unique_dates);
        assert!(merged.len() <= HISTORY_RETENTION_DAYS);
        let mut dates: Vec<&str> = merged.iter().map(|entry| entry.date.as_str()).collect();
        dates.dedup();
        assert_eq!(dates.len(), merged.len());
        // Newest dates survive truncation.
        assert_eq!(merged[0].date, "2026-08-30");
    }
}
