//! Noisy re-scoring of one apparatus for one trial.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::domain::{Apparatus, PodiumError, Result};
use crate::roster::RosterSnapshot;

/// Standard deviation used when none is configured.
pub const DEFAULT_NOISE_STD_DEV: f64 = 0.1;

/// Zero-mean Gaussian perturbation applied to every predicted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    pub std_dev: f64,
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self {
            std_dev: DEFAULT_NOISE_STD_DEV,
        }
    }
}

impl NoiseModel {
    pub fn new(std_dev: f64) -> Self {
        Self { std_dev }
    }

    /// A model that leaves every score untouched.
    pub fn exact() -> Self {
        Self { std_dev: 0.0 }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(PodiumError::InvalidConfiguration(format!(
                "noise standard deviation must be finite and >= 0, got {}",
                self.std_dev
            )));
        }
        Ok(())
    }
}

/// Random stream for a single trial.
///
/// Every trial gets its own ChaCha stream derived from the run seed, so the
/// draws for trial `n` do not depend on which worker runs it or in what order.
pub fn trial_rng(seed: u64, trial: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial);
    rng
}

/// One eligible athlete's perturbed score. `athlete` indexes the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoisyScore {
    pub athlete: usize,
    pub score: f64,
}

/// Produces noisy scores for the athletes entered in an apparatus.
#[derive(Debug, Clone, Copy)]
pub struct TrialGenerator {
    noise: Normal<f64>,
}

impl TrialGenerator {
    pub fn new(model: NoiseModel) -> Result<Self> {
        model.validate()?;
        let noise = Normal::new(0.0, model.std_dev)
            .map_err(|e| PodiumError::InvalidConfiguration(format!("noise model: {e}")))?;
        Ok(Self { noise })
    }

    /// Snapshot indices of athletes with a predicted score for `apparatus`.
    pub fn eligible(roster: &RosterSnapshot, apparatus: Apparatus) -> Vec<usize> {
        roster
            .athletes()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.competes_in(apparatus))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Draw one noise sample per eligible athlete, in roster order.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        roster: &RosterSnapshot,
        apparatus: Apparatus,
        rng: &mut R,
    ) -> Vec<NoisyScore> {
        roster
            .athletes()
            .iter()
            .enumerate()
            .filter_map(|(idx, athlete)| {
                athlete.score(apparatus).map(|predicted| NoisyScore {
                    athlete: idx,
                    score: predicted + self.noise.sample(rng),
                })
            })
            .collect()
    }
}
