use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ingest::{UsageScan, scan_claude_usage, scan_codex_usage};
use usagebar_cache::{CacheStore, MonthlyUsageCache, SourceStatus};
use usagebar_core::{Provider, monthly};

use crate::debounce::Debounce;
use crate::error::{AppError, Result};
use crate::services::RefreshOutcome;

/// Per-provider monthly rollup refresh: debounce, scan off the
/// interactive path, aggregate, tag, store atomically.
pub struct MonthlyScanService {
    provider: Provider,
    root: PathBuf,
    store: Arc<CacheStore>,
    debounce: Debounce,
}

impl MonthlyScanService {
    pub(super) fn new(
        provider: Provider,
        root: PathBuf,
        store: Arc<CacheStore>,
        cooldown: Duration,
    ) -> Self {
        Self {
            provider,
            root,
            store,
            debounce: Debounce::new(cooldown),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome<MonthlyUsageCache>> {
        if !self.debounce.try_begin() {
            return Ok(RefreshOutcome::Debounced);
        }

        let provider = self.provider;
        let root = self.root.clone();
        let scan = match tokio::task::spawn_blocking(move || run_scan(provider, &root)).await {
            Ok(scan) => scan,
            Err(err) => {
                // A panic escaping the scan still leaves consumers a
                // definite, renderable state. If the sentinel write also
                // fails we propagate without attempting further writes.
                self.store
                    .store_monthly(provider, &MonthlyUsageCache::read_error())?;
                return Err(AppError::Task(err.to_string()));
            }
        };

        // Tags mark empty terminal states only: partial data beats an
        // error screen, and the failure detail rides in the scan stats.
        let blob = match monthly::aggregate(&scan.samples) {
            Some(months) => MonthlyUsageCache::new(months, None),
            None if scan.stats.had_read_error() => {
                MonthlyUsageCache::new(Vec::new(), Some(SourceStatus::ReadError))
            }
            None => MonthlyUsageCache::new(Vec::new(), Some(SourceStatus::NoData)),
        };
        self.store.store_monthly(provider, &blob)?;
        Ok(RefreshOutcome::Completed {
            blob,
            stats: scan.stats,
        })
    }
}

fn run_scan(provider: Provider, root: &std::path::Path) -> UsageScan {
    match provider {
        Provider::Claude => scan_claude_usage(root),
        Provider::Codex => scan_codex_usage(root),
    }
}
