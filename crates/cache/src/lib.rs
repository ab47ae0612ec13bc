//! Versioned JSON cache blobs and the atomic read/write store, the
//! boundary between the scan pipeline and the widget/presentation
//! consumers. Writes are temp-then-rename so a concurrent reader never
//! observes a half-written file; unreadable or stale-format blobs load
//! as "no cached state" and are simply rebuilt by the next scan.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use usagebar_core::{DailyUsage, MonthlyStats, Provider};

pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("persist cache file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Terminal empty states a consumer must render distinctly: `noData`
/// means no source logs were found, `readError` means scanning failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceStatus {
    NoData,
    ReadError,
}

/// Monthly rollup blob for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyUsageCache {
    pub version: u32,
    pub fetched_at: String,
    pub months: Vec<MonthlyStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SourceStatus>,
}

impl MonthlyUsageCache {
    pub fn new(months: Vec<MonthlyStats>, status: Option<SourceStatus>) -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            fetched_at: fetch_timestamp(),
            months,
            status,
        }
    }

    pub fn read_error() -> Self {
        Self::new(Vec::new(), Some(SourceStatus::ReadError))
    }
}

/// 90-day daily history blob, shared across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHistoryCache {
    pub version: u32,
    pub fetched_at: String,
    pub entries: Vec<DailyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SourceStatus>,
}

impl DailyHistoryCache {
    pub fn new(entries: Vec<DailyUsage>, status: Option<SourceStatus>) -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            fetched_at: fetch_timestamp(),
            entries,
            status,
        }
    }

    pub fn read_error() -> Self {
        Self::new(Vec::new(), Some(SourceStatus::ReadError))
    }
}

fn fetch_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One JSON document per concern inside a shared cache directory.
/// Explicitly constructed and injectable so tests can point it at a
/// temp directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_monthly(&self, provider: Provider) -> Option<MonthlyUsageCache> {
        self.load(&self.monthly_path(provider))
    }

    pub fn store_monthly(&self, provider: Provider, blob: &MonthlyUsageCache) -> Result<()> {
        self.store(&self.monthly_path(provider), blob)
    }

    pub fn load_daily_history(&self) -> Option<DailyHistoryCache> {
        self.load(&self.daily_history_path())
    }

    pub fn store_daily_history(&self, blob: &DailyHistoryCache) -> Result<()> {
        self.store(&self.daily_history_path(), blob)
    }

    fn monthly_path(&self, provider: Provider) -> PathBuf {
        self.dir.join(format!("{}-monthly.json", provider.as_str()))
    }

    fn daily_history_path(&self) -> PathBuf {
        self.dir.join("daily-history.json")
    }

    // Missing file, unparseable content, and a version mismatch all read
    // as "no cached state"; the next scan rewrites the blob.
    fn load<T: DeserializeOwned + Versioned>(&self, path: &Path) -> Option<T> {
        let bytes = fs::read(path).ok()?;
        let blob: T = serde_json::from_slice(&bytes).ok()?;
        if blob.version() != CACHE_FORMAT_VERSION {
            return None;
        }
        Some(blob)
    }

    fn store<T: Serialize>(&self, path: &Path, blob: &T) -> Result<()> {
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut temp, blob)?;
        temp.persist(path)?;
        Ok(())
    }
}

trait Versioned {
    fn version(&self) -> u32;
}

impl Versioned for MonthlyUsageCache {
    fn version(&self) -> u32 {
        self.version
    }
}

impl Versioned for DailyHistoryCache {
    fn version(&self) -> u32 {
        self.version
    }
}
