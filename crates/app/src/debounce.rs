use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cooldown guard that collapses bursts of redundant scan triggers.
/// Overlapping triggers inside the window are dropped, not queued; the
/// state is owned by one scan service and never shared across providers.
#[derive(Debug)]
pub struct Debounce {
    cooldown: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl Debounce {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_run: Mutex::new(None),
        }
    }

    /// Returns true and stamps the window if a scan may start now.
    pub fn try_begin(&self) -> bool {
        let mut last_run = self
            .last_run
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        if let Some(previous) = *last_run
            && now.duration_since(previous) < self.cooldown
        {
            return false;
        }
        *last_run = Some(now);
        true
    }
}
