mod accumulator;
mod activity;
mod claude;
mod codex;
mod dedup;
mod estimate;
mod fields;
mod paths;
mod scan;

pub use accumulator::SessionAccumulator;
pub use activity::{ActivityScan, scan_daily_activity};
pub use claude::scan_claude_usage;
pub use codex::scan_codex_usage;
pub use dedup::{DedupLedger, extract_key};
pub use estimate::estimate_tokens;
pub use paths::{default_claude_root, default_codex_root};
pub use scan::{ScanIssue, ScanStats, UsageScan};
