use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ingest::{ScanStats, scan_daily_activity};
use usagebar_cache::{CacheStore, DailyHistoryCache, SourceStatus};
use usagebar_core::daily;

use crate::debounce::Debounce;
use crate::error::{AppError, Result};
use crate::services::RefreshOutcome;

/// Heatmap history refresh: scan both roots with the token estimator,
/// merge into the persisted 90-day history, store atomically.
pub struct DailyScanService {
    claude_root: PathBuf,
    codex_root: PathBuf,
    store: Arc<CacheStore>,
    debounce: Debounce,
}

impl DailyScanService {
    pub(super) fn new(
        claude_root: PathBuf,
        codex_root: PathBuf,
        store: Arc<CacheStore>,
        cooldown: Duration,
    ) -> Self {
        Self {
            claude_root,
            codex_root,
            store,
            debounce: Debounce::new(cooldown),
        }
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome<DailyHistoryCache>> {
        if !self.debounce.try_begin() {
            return Ok(RefreshOutcome::Debounced);
        }

        let claude_root = self.claude_root.clone();
        let codex_root = self.codex_root.clone();
        let store = self.store.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let scan = scan_daily_activity(&claude_root, &codex_root);
            let aggregated = daily::aggregate(&scan.entries);
            let existing = store
                .load_daily_history()
                .map(|blob| blob.entries)
                .unwrap_or_default();
            (daily::merge(&aggregated, &existing), scan.stats)
        })
        .await;

        let (merged, stats): (_, ScanStats) = match joined {
            Ok(result) => result,
            Err(err) => {
                self.store
                    .store_daily_history(&DailyHistoryCache::read_error())?;
                return Err(AppError::Task(err.to_string()));
            }
        };

        let status = if merged.is_empty() {
            if stats.had_read_error() {
                Some(SourceStatus::ReadError)
            } else {
                Some(SourceStatus::NoData)
            }
        } else {
            None
        };
        let blob = DailyHistoryCache::new(merged, status);
        self.store.store_daily_history(&blob)?;
        Ok(RefreshOutcome::Completed { blob, stats })
    }
}
