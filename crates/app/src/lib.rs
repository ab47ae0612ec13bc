pub mod app;
pub mod debounce;
pub mod error;
pub mod services;

pub use app::{AppConfig, AppState};
pub use debounce::Debounce;
pub use error::{AppError, Result};
pub use services::{AppServices, DailyScanService, MonthlyScanService, RefreshOutcome};
