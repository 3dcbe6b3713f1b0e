//! Structured observability hooks for simulation runs and roster edits.
//!
//! This module provides:
//! - Run-scoped tracing spans via the `RunSpan` RAII guard
//! - Emission functions for lifecycle events: start, finish, cancel, short field
//!
//! Events are emitted at `info!` level except short fields and cancellations,
//! which are `warn!`. Filter with `RUST_LOG`.

use tracing::{debug, info, warn};

use crate::domain::Apparatus;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("5f0c...");
/// // every event below carries run_id = "5f0c..."
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("podium.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: simulation started.
pub fn emit_simulation_started(athletes: usize, trials: u64, apparatus: &[Apparatus], seed: u64) {
    let apparatus = apparatus
        .iter()
        .map(|a| a.code())
        .collect::<Vec<_>>()
        .join(",");
    info!(
        event = "simulation.started",
        athletes = athletes,
        trials = trials,
        apparatus = %apparatus,
        seed = seed,
    );
}

/// Emit event: simulation finished with every requested trial.
pub fn emit_simulation_finished(duration_ms: u64, trials: u64, medals_awarded: u64) {
    info!(
        event = "simulation.finished",
        duration_ms = duration_ms,
        trials = trials,
        medals_awarded = medals_awarded,
    );
}

/// Emit event: simulation stopped at a trial boundary before completing.
pub fn emit_simulation_cancelled(trials_completed: u64, trials_requested: u64) {
    warn!(
        event = "simulation.cancelled",
        trials_completed = trials_completed,
        trials_requested = trials_requested,
    );
}

/// Emit event: an apparatus has fewer entrants than podium places.
pub fn emit_short_field(apparatus: Apparatus, eligible: usize) {
    warn!(
        event = "apparatus.short_field",
        apparatus = %apparatus,
        eligible = eligible,
        "fewer than three eligible athletes; missing places are not awarded",
    );
}

/// Emit event: the roster was edited.
pub fn emit_roster_changed(operation: &str, athlete: &str, roster_len: usize) {
    debug!(
        event = "roster.changed",
        operation = %operation,
        athlete = %athlete,
        roster_len = roster_len,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
    }
}
