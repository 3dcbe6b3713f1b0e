//! Global atomic counters for Podium simulation runs.
//!
//! Counters are incremented by the driver as it goes. Call [`Metrics::flush`]
//! to emit current values as a single `tracing::info!` event (e.g. when the
//! CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Atomic counters, no locking.
pub struct Metrics {
    runs_started: AtomicU64,
    trials_completed: AtomicU64,
    medals_awarded: AtomicU64,
    short_field_rounds: AtomicU64,
    runs_cancelled: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            trials_completed: AtomicU64::new(0),
            medals_awarded: AtomicU64::new(0),
            short_field_rounds: AtomicU64::new(0),
            runs_cancelled: AtomicU64::new(0),
        }
    }

    pub fn inc_runs(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_started", "counter incremented");
    }

    pub fn add_trials(&self, n: u64) {
        self.trials_completed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_medals(&self, n: u64) {
        self.medals_awarded.fetch_add(n, Ordering::Relaxed);
    }

    /// Rounds (apparatus × trial) that had fewer than three entrants.
    pub fn add_short_field_rounds(&self, n: u64) {
        self.short_field_rounds.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_cancelled(&self) {
        self.runs_cancelled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_cancelled", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            trials_completed = self.trials_completed(),
            medals_awarded = self.medals_awarded(),
            short_field_rounds = self.short_field_rounds(),
            runs_cancelled = self.runs_cancelled(),
        );
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn trials_completed(&self) -> u64 {
        self.trials_completed.load(Ordering::Relaxed)
    }

    pub fn medals_awarded(&self) -> u64 {
        self.medals_awarded.load(Ordering::Relaxed)
    }

    pub fn short_field_rounds(&self) -> u64 {
        self.short_field_rounds.load(Ordering::Relaxed)
    }

    pub fn runs_cancelled(&self) -> u64 {
        self.runs_cancelled.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_started.store(0, Ordering::Relaxed);
        self.trials_completed.store(0, Ordering::Relaxed);
        self.medals_awarded.store(0, Ordering::Relaxed);
        self.short_field_rounds.store(0, Ordering::Relaxed);
        self.runs_cancelled.store(0, Ordering::Relaxed);
    }
}
