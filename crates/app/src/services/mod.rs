mod daily;
mod monthly;

use std::sync::Arc;
use std::time::Duration;

use usagebar_cache::CacheStore;
use usagebar_core::Provider;

use crate::app::AppConfig;

pub use daily::DailyScanService;
pub use monthly::MonthlyScanService;

pub(crate) const MONTHLY_SCAN_COOLDOWN: Duration = Duration::from_secs(10);
// The daily scan walks both roots and is triggered less urgently.
pub(crate) const DAILY_SCAN_COOLDOWN: Duration = Duration::from_secs(60);

/// Result of one refresh trigger. A suppressed trigger is a distinct
/// outcome, not an error.
#[derive(Debug)]
pub enum RefreshOutcome<T> {
    Debounced,
    Completed {
        blob: T,
        stats: ingest::ScanStats,
    },
}

/// Scan service registry. Provider scans own disjoint roots and cache
/// files and may be refreshed concurrently.
pub struct AppServices {
    pub claude_monthly: MonthlyScanService,
    pub codex_monthly: MonthlyScanService,
    pub daily: DailyScanService,
}

impl AppServices {
    pub(crate) fn new(config: &AppConfig, store: Arc<CacheStore>) -> Self {
        Self {
            claude_monthly: MonthlyScanService::new(
                Provider::Claude,
                config.claude_root.clone(),
                store.clone(),
                MONTHLY_SCAN_COOLDOWN,
            ),
            codex_monthly: MonthlyScanService::new(
                Provider::Codex,
                config.codex_root.clone(),
                store.clone(),
                MONTHLY_SCAN_COOLDOWN,
            ),
            daily: DailyScanService::new(
                config.claude_root.clone(),
                config.codex_root.clone(),
                store,
                DAILY_SCAN_COOLDOWN,
            ),
        }
    }
}
