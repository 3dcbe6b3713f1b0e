//! Parallel simulation driver.
//!
//! Trials have no data dependency on each other, so a run can be split across
//! Tokio blocking workers:
//! - trial indices are divided into contiguous chunks, one per worker
//! - each worker owns its own [`MedalTally`] and draws from per-trial random
//!   streams, so no RNG or counter state is shared
//! - tallies are summed once every worker has joined
//!
//! Because each trial's random stream depends only on the run seed and the
//! trial index, a completed parallel run is identical to the sequential run
//! with the same seed, whatever the worker count.

use std::ops::Range;

use tokio::task::JoinSet;
use tracing::{debug, Instrument};

use crate::domain::{PodiumError, Result};
use crate::driver::{CancelFlag, Simulation, SimulationOutcome};
use crate::obs;
use crate::roster::RosterSnapshot;
use crate::tally::MedalTally;

/// Run `simulation` against `roster` on up to `workers` blocking tasks.
///
/// Cancellation is observed by every worker at its next trial boundary. A
/// cancelled parallel run reports how many trials finished in total; those
/// trials are not necessarily a prefix of the trial sequence.
///
/// # Errors
///
/// - `PodiumError::InvalidConfiguration`: `workers` is zero.
/// - `PodiumError::Validation`: the roster holds an invalid athlete.
/// - `PodiumError::WorkerJoin`: a worker task panicked.
pub async fn run_parallel(
    simulation: &Simulation,
    roster: &RosterSnapshot,
    workers: usize,
    cancel: Option<CancelFlag>,
) -> Result<SimulationOutcome> {
    if workers == 0 {
        return Err(PodiumError::InvalidConfiguration(
            "worker count must be positive".to_string(),
        ));
    }

    let run = simulation.start(roster)?;
    let trials = simulation.config().trials;
    let span = tracing::info_span!("podium.run", run_id = %run.run_id);

    async move {
        obs::emit_simulation_started(
            roster.len(),
            trials,
            &simulation.config().apparatus,
            run.plan.seed,
        );

        let mut join_set = JoinSet::new();
        for range in chunk_ranges(trials, workers) {
            let plan = run.plan.clone();
            let cancel = cancel.clone();
            debug!(start = range.start, end = range.end, "spawning trial worker");
            join_set.spawn_blocking(move || plan.run_range(range, cancel.as_ref()));
        }

        let mut tally = MedalTally::default();
        let mut completed = 0;
        while let Some(joined) = join_set.join_next().await {
            let (worker_tally, worker_completed) =
                joined.map_err(|e| PodiumError::WorkerJoin(e.to_string()))?;
            tally.merge(&worker_tally);
            completed += worker_completed;
        }

        Ok(simulation.finish(run, tally, completed))
    }
    .instrument(span)
    .await
}

/// Split `0..trials` into at most `workers` contiguous, non-empty ranges whose
/// lengths differ by at most one.
fn chunk_ranges(trials: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = (workers as u64).min(trials).max(1);
    let base = trials / workers;
    let extra = trials % workers;

    let mut ranges = Vec::with_capacity(workers as usize);
    let mut start = 0;
    for worker in 0..workers {
        let len = base + u64::from(worker < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}
