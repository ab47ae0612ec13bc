use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cache error: {0}")]
    Cache(#[from] usagebar_cache::CacheError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("scan task failed: {0}")]
    Task(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
