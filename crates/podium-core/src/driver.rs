//! Simulation driver.
//!
//! Runs `trials` independent re-scorings of every configured apparatus,
//! awarding gold/silver/bronze to the top three noisy scores each time, and
//! returns the roster sorted into a medal table.
//!
//! Validation and configuration errors are raised before any trial runs.
//! Apparatuses with fewer than three entrants are not errors: the missing
//! places are simply not awarded and an [`InsufficientCompetitors`] warning is
//! attached to the outcome.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Apparatus, Athlete, AthleteId, PodiumError, Result, ValidationError};
use crate::metrics::METRICS;
use crate::obs::{self, RunSpan};
use crate::ranker::{self, PODIUM_PLACES};
use crate::roster::RosterSnapshot;
use crate::tally::{MedalCounts, MedalTally};
use crate::trial::{trial_rng, NoiseModel, TrialGenerator};

/// Number of trials in a default run.
pub const DEFAULT_TRIALS: u64 = 1000;

/// Where a run's randomness comes from.
///
/// Has no `Default`; callers pick between reproducible and entropy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Reproducible run from a caller-supplied seed.
    Fixed(u64),
    /// Seed drawn from system entropy at run start.
    Entropy,
}

impl SeedPolicy {
    /// Concrete seed for a run. Entropy runs still record the drawn seed so
    /// they can be replayed afterwards.
    pub fn resolve(self) -> u64 {
        match self {
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::Entropy => rand::thread_rng().gen(),
        }
    }
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub trials: u64,
    /// Simulated in this order within every trial.
    pub apparatus: Vec<Apparatus>,
    pub seed: SeedPolicy,
    pub noise: NoiseModel,
}

impl SimulationConfig {
    pub fn new(trials: u64, apparatus: Vec<Apparatus>, seed: SeedPolicy) -> Self {
        Self {
            trials,
            apparatus,
            seed,
            noise: NoiseModel::default(),
        }
    }

    /// 1000 trials over all four apparatuses with the default noise model.
    pub fn default_with_seed(seed: SeedPolicy) -> Self {
        Self::new(DEFAULT_TRIALS, Apparatus::ALL.to_vec(), seed)
    }

    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(PodiumError::InvalidConfiguration(
                "number of trials must be positive".to_string(),
            ));
        }
        if self.apparatus.is_empty() {
            return Err(PodiumError::InvalidConfiguration(
                "apparatus list must not be empty".to_string(),
            ));
        }
        for (idx, apparatus) in self.apparatus.iter().enumerate() {
            if self.apparatus[..idx].contains(apparatus) {
                return Err(PodiumError::InvalidConfiguration(format!(
                    "apparatus {apparatus} listed more than once"
                )));
            }
        }
        self.noise.validate()
    }
}

/// Cooperative cancellation shared between a caller and a running simulation.
///
/// Checked only between trials, so a cancelled run never contains a
/// half-simulated trial.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whether a run completed every requested trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Completed,
    /// Stopped early; counts cover only `trials_completed` trials.
    Cancelled,
}

/// Apparatus that had fewer than three entrants in every round of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientCompetitors {
    pub apparatus: Apparatus,
    pub eligible: usize,
    /// Trials in which the apparatus was contested short-handed.
    pub rounds: u64,
    /// Podium places left unawarded across those rounds.
    pub positions_skipped: u64,
}

/// One row of the final medal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub athlete: Athlete,
    pub medals: MedalCounts,
}

/// Result of a simulation run: the roster augmented with medal counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub run_id: Uuid,
    /// Seed actually used, including for entropy runs.
    pub seed: u64,
    pub roster_digest: String,
    pub apparatus: Vec<Apparatus>,
    pub trials_requested: u64,
    pub trials_completed: u64,
    pub status: RunStatus,
    /// Sorted by gold, silver, bronze (descending), then canonical identity.
    pub standings: Vec<Standing>,
    pub warnings: Vec<InsufficientCompetitors>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SimulationOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Medals handed out across all athletes and colours.
    pub fn total_medals(&self) -> u64 {
        self.standings.iter().map(|s| s.medals.total()).sum()
    }

    pub fn standing(&self, id: &AthleteId) -> Option<&Standing> {
        self.standings.iter().find(|s| &s.athlete.id == id)
    }
}

/// A validated simulation ready to run against roster snapshots.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    generator: TrialGenerator,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let generator = TrialGenerator::new(config.noise)?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every trial sequentially.
    ///
    /// If `cancel` is raised, the run stops at the next trial boundary and
    /// returns a [`RunStatus::Cancelled`] outcome with the partial tally.
    pub fn run(
        &self,
        roster: &RosterSnapshot,
        cancel: Option<&CancelFlag>,
    ) -> Result<SimulationOutcome> {
        let run = self.start(roster)?;
        let _span = RunSpan::enter(&run.run_id.to_string());
        obs::emit_simulation_started(
            roster.len(),
            self.config.trials,
            &self.config.apparatus,
            run.plan.seed,
        );

        let (tally, completed) = run.plan.run_range(0..self.config.trials, cancel);
        Ok(self.finish(run, tally, completed))
    }

    /// Validate inputs, resolve the seed and build the per-run plan.
    pub(crate) fn start(&self, roster: &RosterSnapshot) -> Result<PreparedRun> {
        for athlete in roster.athletes() {
            athlete.validate()?;
        }
        if let Some(dup) = roster.first_duplicate_id() {
            return Err(ValidationError::DuplicateAthlete(dup).into());
        }

        METRICS.inc_runs();
        let seed = self.config.seed.resolve();
        let plan = TrialPlan {
            roster: roster.clone(),
            apparatus: self.config.apparatus.clone(),
            generator: self.generator,
            seed,
        };
        for &apparatus in &plan.apparatus {
            let eligible = TrialGenerator::eligible(roster, apparatus).len();
            if eligible < PODIUM_PLACES {
                obs::emit_short_field(apparatus, eligible);
            }
        }

        Ok(PreparedRun {
            run_id: Uuid::new_v4(),
            plan,
            started_at: Utc::now(),
            clock: Instant::now(),
        })
    }

    /// Build the outcome from the merged tally of `completed` trials.
    pub(crate) fn finish(
        &self,
        run: PreparedRun,
        tally: MedalTally,
        completed: u64,
    ) -> SimulationOutcome {
        let roster = &run.plan.roster;
        let status = if completed < self.config.trials {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        let warnings: Vec<InsufficientCompetitors> = self
            .config
            .apparatus
            .iter()
            .filter_map(|&apparatus| {
                let eligible = TrialGenerator::eligible(roster, apparatus).len();
                (eligible < PODIUM_PLACES).then(|| InsufficientCompetitors {
                    apparatus,
                    eligible,
                    rounds: completed,
                    positions_skipped: completed * (PODIUM_PLACES - eligible) as u64,
                })
            })
            .collect();

        let mut standings: Vec<Standing> = roster
            .athletes()
            .iter()
            .map(|athlete| Standing {
                medals: tally.counts(&athlete.id),
                athlete: athlete.clone(),
            })
            .collect();
        standings.sort_by(|a, b| {
            a.medals
                .table_cmp(&b.medals)
                .then_with(|| a.athlete.canonical_cmp(&b.athlete))
        });

        let medals_awarded = tally.total_awarded();
        METRICS.add_trials(completed);
        METRICS.add_medals(medals_awarded);
        METRICS.add_short_field_rounds(completed * warnings.len() as u64);

        let duration_ms = run.clock.elapsed().as_millis() as u64;
        match status {
            RunStatus::Completed => {
                obs::emit_simulation_finished(duration_ms, completed, medals_awarded)
            }
            RunStatus::Cancelled => {
                METRICS.inc_cancelled();
                obs::emit_simulation_cancelled(completed, self.config.trials);
            }
        }

        SimulationOutcome {
            run_id: run.run_id,
            seed: run.plan.seed,
            roster_digest: roster.digest(),
            apparatus: self.config.apparatus.clone(),
            trials_requested: self.config.trials,
            trials_completed: completed,
            status,
            standings,
            warnings,
            started_at: run.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Bookkeeping for a run between [`Simulation::start`] and [`Simulation::finish`].
pub(crate) struct PreparedRun {
    pub(crate) run_id: Uuid,
    pub(crate) plan: TrialPlan,
    started_at: DateTime<Utc>,
    clock: Instant,
}

/// Everything a worker needs to simulate trials. Cheap to clone.
#[derive(Debug, Clone)]
pub(crate) struct TrialPlan {
    roster: RosterSnapshot,
    apparatus: Vec<Apparatus>,
    generator: TrialGenerator,
    pub(crate) seed: u64,
}

impl TrialPlan {
    /// Simulate one trial: every apparatus once, in configured order.
    fn run_trial(&self, trial: u64, tally: &mut MedalTally) {
        let mut rng = trial_rng(self.seed, trial);
        let athletes = self.roster.athletes();
        for &apparatus in &self.apparatus {
            let scores = self.generator.generate(&self.roster, apparatus, &mut rng);
            let ranking = ranker::rank(&self.roster, scores);
            for (medal, entry) in ranker::podium(&ranking) {
                tally.award(athletes[entry.athlete].id, medal);
            }
        }
    }

    /// Simulate `trials` in order into a fresh tally, stopping early at a trial
    /// boundary if cancelled. Returns the tally and the number of trials run.
    pub(crate) fn run_range(
        &self,
        trials: Range<u64>,
        cancel: Option<&CancelFlag>,
    ) -> (MedalTally, u64) {
        let mut tally = MedalTally::zeroed(self.roster.athletes().iter().map(|a| a.id));
        let mut completed = 0;
        for trial in trials {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                debug!(trial, "cancellation observed at trial boundary");
                break;
            }
            self.run_trial(trial, &mut tally);
            completed += 1;
        }
        (tally, completed)
    }
}

/// Run `trials` trials over `apparatus` with the default noise model.
pub fn simulate(
    roster: &RosterSnapshot,
    trials: u64,
    apparatus: &[Apparatus],
    seed: SeedPolicy,
) -> Result<SimulationOutcome> {
    Simulation::new(SimulationConfig::new(trials, apparatus.to_vec(), seed))?.run(roster, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::Medal;

    fn scenario_roster() -> RosterSnapshot {
        RosterSnapshot::from(vec![
            Athlete::new("Ava", "Able", "USA")
                .with_score(Apparatus::BalanceBeam, 15.0)
                .with_score(Apparatus::Vault, 14.0),
            Athlete::new("Bea", "Baker", "BRA").with_score(Apparatus::BalanceBeam, 14.5),
            Athlete::new("Cat", "Cole", "CHN").with_score(Apparatus::BalanceBeam, 14.0),
        ])
    }

    #[test]
    fn test_config_rejects_zero_trials() {
        let config = SimulationConfig::new(0, vec![Apparatus::BalanceBeam], SeedPolicy::Fixed(1));
        let err = Simulation::new(config).unwrap_err();
        assert!(matches!(err, PodiumError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_config_rejects_empty_apparatus() {
        let config = SimulationConfig::new(10, vec![], SeedPolicy::Fixed(1));
        assert!(matches!(
            config.validate().unwrap_err(),
            PodiumError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn test_config_rejects_duplicate_apparatus() {
        let config = SimulationConfig::new(
            10,
            vec![Apparatus::Vault, Apparatus::BalanceBeam, Apparatus::Vault],
            SeedPolicy::Fixed(1),
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("VT"));
    }

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default_with_seed(SeedPolicy::Entropy);
        assert_eq!(config.trials, DEFAULT_TRIALS);
        assert_eq!(config.apparatus, Apparatus::ALL.to_vec());
        assert_eq!(config.noise.std_dev, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_single_exact_trial_awards_in_score_order() {
        let roster = scenario_roster();
        let config = SimulationConfig::new(1, vec![Apparatus::BalanceBeam], SeedPolicy::Fixed(9))
            .with_noise(NoiseModel::exact());
        let outcome = Simulation::new(config).unwrap().run(&roster, None).unwrap();

        let names: Vec<&str> = outcome
            .standings
            .iter()
            .map(|s| s.athlete.last_name.as_str())
            .collect();
        assert_eq!(names, vec!["Able", "Baker", "Cole"]);
        assert_eq!(outcome.standings[0].medals, MedalCounts::new(1, 0, 0));
        assert_eq!(outcome.standings[1].medals, MedalCounts::new(0, 1, 0));
        assert_eq!(outcome.standings[2].medals, MedalCounts::new(0, 0, 1));
        assert!(outcome.is_complete());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_cancel_before_start_returns_empty_partial_tally() {
        let roster = scenario_roster();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let simulation =
            Simulation::new(SimulationConfig::default_with_seed(SeedPolicy::Fixed(3))).unwrap();
        let outcome = simulation.run(&roster, Some(&cancel)).unwrap();
        assert_eq!(outcome.status, RunStatus::Cancelled);
        assert_eq!(outcome.trials_completed, 0);
        assert_eq!(outcome.total_medals(), 0);
        assert_eq!(outcome.standings.len(), roster.len());
    }

    #[test]
    fn test_cancel_mid_run_keeps_partial_tally() {
        let roster = scenario_roster();
        let trials = 50_000_000;
        let simulation = Simulation::new(SimulationConfig::new(
            trials,
            vec![Apparatus::BalanceBeam],
            SeedPolicy::Fixed(8),
        ))
        .unwrap();

        let cancel = CancelFlag::new();
        let canceller = {
            let cancel = cancel.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(200));
                cancel.cancel();
            })
        };
        let outcome = simulation.run(&roster, Some(&cancel)).unwrap();
        canceller.join().unwrap();

        assert_eq!(outcome.status, RunStatus::Cancelled);
        assert!(outcome.trials_completed > 0);
        assert!(outcome.trials_completed < trials);
        // Three beam entrants: every completed trial awards all three places.
        assert_eq!(
            outcome.total_medals(),
            outcome.trials_completed * PODIUM_PLACES as u64
        );
        let golds: u64 = outcome.standings.iter().map(|s| s.medals.gold).sum();
        assert_eq!(golds, outcome.trials_completed);
    }

    #[test]
    fn test_invalid_athlete_in_snapshot_aborts_run() {
        let roster = RosterSnapshot::from(vec![
            Athlete::new("Ava", "Able", "USA").with_score(Apparatus::Vault, f64::NAN)
        ]);
        let err = simulate(&roster, 10, &[Apparatus::Vault], SeedPolicy::Fixed(1)).unwrap_err();
        assert!(matches!(
            err,
            PodiumError::Validation(ValidationError::NonFiniteScore { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_in_snapshot_abort_run() {
        let a = Athlete::new("Ava", "Able", "USA").with_score(Apparatus::Vault, 14.0);
        let roster = RosterSnapshot::from(vec![a.clone(), a]);
        let err = simulate(&roster, 10, &[Apparatus::Vault], SeedPolicy::Fixed(1)).unwrap_err();
        assert!(matches!(
            err,
            PodiumError::Validation(ValidationError::DuplicateAthlete(_))
        ));
    }

    #[test]
    fn test_short_field_is_a_warning_not_an_error() {
        let roster = scenario_roster();
        let outcome = simulate(&roster, 50, &[Apparatus::Vault], SeedPolicy::Fixed(5)).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(
            outcome.warnings,
            vec![InsufficientCompetitors {
                apparatus: Apparatus::Vault,
                eligible: 1,
                rounds: 50,
                positions_skipped: 100,
            }]
        );
        let able = &outcome.standings[0];
        assert_eq!(able.athlete.last_name, "Able");
        assert_eq!(able.medals, MedalCounts::new(50, 0, 0));
        assert_eq!(outcome.total_medals(), 50);
    }

    #[test]
    fn test_run_range_partial_trials_sum() {
        let roster = scenario_roster();
        let simulation = Simulation::new(SimulationConfig::new(
            10,
            vec![Apparatus::BalanceBeam],
            SeedPolicy::Fixed(11),
        ))
        .unwrap();
        let run = simulation.start(&roster).unwrap();
        let (left, n_left) = run.plan.run_range(0..4, None);
        let (right, n_right) = run.plan.run_range(4..10, None);
        let (whole, n_whole) = run.plan.run_range(0..10, None);
        assert_eq!((n_left, n_right, n_whole), (4, 6, 10));

        let mut merged = left;
        merged.merge(&right);
        assert_eq!(merged, whole);
        for athlete in roster.athletes() {
            let counts = whole.counts(&athlete.id);
            assert!(counts.get(Medal::Gold) <= 10);
        }
    }

    #[test]
    fn test_entropy_seed_is_recorded_and_replayable() {
        let roster = scenario_roster();
        let first = simulate(&roster, 20, &[Apparatus::BalanceBeam], SeedPolicy::Entropy).unwrap();
        let replay = simulate(
            &roster,
            20,
            &[Apparatus::BalanceBeam],
            SeedPolicy::Fixed(first.seed),
        )
        .unwrap();
        assert_eq!(first.standings, replay.standings);
    }
}
