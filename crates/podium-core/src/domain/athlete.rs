//! Athlete identity and predicted scores.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::apparatus::Apparatus;
use super::error::ValidationError;

/// Synthetic athlete identifier.
///
/// Medal tallies are keyed by this id, so two athletes sharing a surname (or a
/// full name) never have their medals merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteId(pub Uuid);

impl AthleteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AthleteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A gymnast with a predicted score per apparatus they compete in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub first_name: String,
    pub last_name: String,
    /// Uppercase country code, normalized at ingestion.
    pub country: String,
    /// Apparatuses without an entry are not contested by this athlete.
    #[serde(default)]
    pub scores: BTreeMap<Apparatus, f64>,
}

impl Athlete {
    /// Create an athlete with a fresh id and no scores.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        country: impl AsRef<str>,
    ) -> Self {
        Self {
            id: AthleteId::new(),
            first_name: first_name.into().trim().to_string(),
            last_name: last_name.into().trim().to_string(),
            country: normalize_country(country.as_ref()),
            scores: BTreeMap::new(),
        }
    }

    /// Set the predicted score for one apparatus.
    pub fn with_score(mut self, apparatus: Apparatus, score: f64) -> Self {
        self.scores.insert(apparatus, score);
        self
    }

    pub fn with_id(mut self, id: AthleteId) -> Self {
        self.id = id;
        self
    }

    /// Predicted score, or `None` when the athlete does not compete.
    pub fn score(&self, apparatus: Apparatus) -> Option<f64> {
        self.scores.get(&apparatus).copied()
    }

    pub fn competes_in(&self, apparatus: Apparatus) -> bool {
        self.scores.contains_key(&apparatus)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check names and that every provided score is finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "first_name",
            });
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "last_name" });
        }
        if self.country.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "country" });
        }
        for (&apparatus, &value) in &self.scores {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteScore {
                    athlete: self.display_name(),
                    apparatus,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Fixed total order used to break every tie: last name, first name,
    /// country, then id.
    pub fn canonical_cmp(&self, other: &Athlete) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
            .then_with(|| self.country.cmp(&other.country))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Input shape for roster files.
///
/// `null` scores are treated the same as a missing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteRecord {
    #[serde(default)]
    pub id: Option<AthleteId>,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    #[serde(default)]
    pub scores: BTreeMap<Apparatus, Option<f64>>,
}

impl AthleteRecord {
    /// Normalize into an [`Athlete`], assigning a fresh id when none is given.
    ///
    /// Validation happens when the athlete is appended to a roster.
    pub fn into_athlete(self) -> Athlete {
        let mut athlete = Athlete::new(self.first_name, self.last_name, &self.country);
        if let Some(id) = self.id {
            athlete.id = id;
        }
        athlete.scores = self
            .scores
            .into_iter()
            .filter_map(|(apparatus, score)| score.map(|s| (apparatus, s)))
            .collect();
        athlete
    }
}

impl From<AthleteRecord> for Athlete {
    fn from(record: AthleteRecord) -> Self {
        record.into_athlete()
    }
}

impl From<Athlete> for AthleteRecord {
    fn from(athlete: Athlete) -> Self {
        Self {
            id: Some(athlete.id),
            first_name: athlete.first_name,
            last_name: athlete.last_name,
            country: athlete.country,
            scores: athlete
                .scores
                .into_iter()
                .map(|(apparatus, score)| (apparatus, Some(score)))
                .collect(),
        }
    }
}

pub(crate) fn normalize_country(country: &str) -> String {
    country.trim().to_uppercase()
}
