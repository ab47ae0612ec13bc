use std::path::PathBuf;

const HISTORY_FILE_NAME: &str = "daily-history.json";

#[derive(Debug, Clone)]
pub struct CacheDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

pub fn resolve_cache_dir() -> Result<CacheDirResolution, String> {
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    let base = PathBuf::from(home)
        .join("Library")
        .join("Application Support");

    let candidates = [
        base.join("UsageBar").join("cache"),
        base.join("com.usagebar.app").join("cache"),
        base.join("usagebar").join("cache"),
    ];

    for candidate in candidates {
        if candidate.join(HISTORY_FILE_NAME).exists() {
            return Ok(CacheDirResolution {
                dir: candidate,
                matched_existing: true,
            });
        }
    }

    Ok(CacheDirResolution {
        dir: base.join("usagebar").join("cache"),
        matched_existing: false,
    })
}
