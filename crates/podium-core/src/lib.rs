//! Podium Core Library
//!
//! Monte Carlo medal-outcome simulation for gymnastics rosters: perturb each
//! athlete's predicted apparatus scores with Gaussian noise, rank every
//! apparatus, and count how often each athlete finishes first, second or third.

pub mod country;
pub mod domain;
pub mod driver;
pub mod metrics;
pub mod obs;
pub mod parallel;
pub mod ranker;
pub mod roster;
pub mod tally;
pub mod telemetry;
pub mod trial;

pub use country::medals_for_country;
pub use domain::{
    Apparatus, Athlete, AthleteId, AthleteRecord, PodiumError, Result, ValidationError,
};
pub use driver::{
    simulate, CancelFlag, InsufficientCompetitors, RunStatus, SeedPolicy, Simulation,
    SimulationConfig, SimulationOutcome, Standing, DEFAULT_TRIALS,
};
pub use parallel::run_parallel;
pub use ranker::{podium, rank, PODIUM_PLACES};
pub use roster::{RosterSnapshot, RosterStore};
pub use tally::{Medal, MedalCounts, MedalTally};
pub use trial::{trial_rng, NoiseModel, NoisyScore, TrialGenerator, DEFAULT_NOISE_STD_DEV};

pub use metrics::METRICS;
pub use obs::{
    emit_roster_changed, emit_short_field, emit_simulation_cancelled, emit_simulation_finished,
    emit_simulation_started, RunSpan,
};
pub use telemetry::init_tracing;

/// Podium version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
