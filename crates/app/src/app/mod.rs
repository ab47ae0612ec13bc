use std::path::PathBuf;
use std::sync::Arc;

use usagebar_cache::CacheStore;

use crate::error::Result;
use crate::services::AppServices;

/// Log roots and cache location for one app instance. Built explicitly
/// by the caller; nothing here is looked up globally.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub claude_root: PathBuf,
    pub codex_root: PathBuf,
    pub cache_dir: PathBuf,
}

impl AppConfig {
    /// Roots from the producing CLIs' env overrides / `$HOME`, cache
    /// under the given directory.
    pub fn with_default_roots(cache_dir: PathBuf) -> Self {
        Self {
            claude_root: ingest::default_claude_root(),
            codex_root: ingest::default_codex_root(),
            cache_dir,
        }
    }
}

/// Cache store plus the scan service registry.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<CacheStore>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = Arc::new(CacheStore::new(config.cache_dir.clone())?);
        let services = AppServices::new(&config, store.clone());
        Ok(Self {
            config,
            store,
            services,
        })
    }
}
