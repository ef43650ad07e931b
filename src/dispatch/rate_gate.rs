use log::debug;
use crate::constants;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Whether pacing is shared by every provider or kept per provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingScope {
    #[default]
    Global,
    PerProvider,
}

impl PacingScope {
    /// Parse the configuration spelling (`global` / `per_provider`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "global" => Some(PacingScope::Global),
            "per_provider" | "per-provider" => Some(PacingScope::PerProvider),
            _ => None,
        }
    }
}

/// Enforces a minimum interval between dispatch starts
///
/// Each `wait()` reserves the earliest start slot at least `min_interval` after the
/// previous reservation, then sleeps until it outside the lock. Concurrent callers
/// are spaced out in reservation order; callers are not queued behind each other's
/// network calls.
pub struct RateGate {
    min_interval: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl RateGate {
    /// Intervals above one hour are capped at one hour
    pub fn new(min_interval: Duration) -> Self {
        let min_interval = min_interval.min(Duration::from_secs(constants::MAX_MIN_INTERVAL_SECS));
        Self { min_interval, last_slot: Mutex::new(None) }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until this caller may start its dispatch
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut last_slot = self.last_slot.lock().await;
            let now = Instant::now();
            let slot = match *last_slot {
                Some(previous) => previous.checked_add(self.min_interval).unwrap_or(now).max(now),
                None => now,
            };
            *last_slot = Some(slot);
            slot
        };

        if slot > Instant::now() {
            debug!("RateGate: pacing for {:?}", slot.saturating_duration_since(Instant::now()));
            sleep_until(slot).await;
        }
    }
}
