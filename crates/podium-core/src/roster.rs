//! In-memory roster of athletes.
//!
//! [`RosterStore`] is the single writer: athletes are appended or the most
//! recent one removed between simulation runs. The driver only ever reads a
//! [`RosterSnapshot`], which is immutable and unaffected by later edits.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::domain::{Athlete, AthleteId, AthleteRecord, PodiumError, Result, ValidationError};
use crate::obs;

/// Ordered, append-only-at-the-end athlete table.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    athletes: Vec<Athlete>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from roster-file records, validating each one.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = AthleteRecord>,
    {
        let mut store = Self::new();
        for record in records {
            store.append_record(record)?;
        }
        Ok(store)
    }

    /// Parse a JSON array of [`AthleteRecord`]s.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<AthleteRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Append one athlete to the end of the roster.
    ///
    /// # Errors
    ///
    /// - `ValidationError::NonFiniteScore`: a provided score is NaN or infinite.
    /// - `ValidationError::EmptyField`: a name or the country is blank.
    /// - `ValidationError::DuplicateAthlete`: the id is already in the roster.
    pub fn append(&mut self, athlete: Athlete) -> Result<()> {
        athlete.validate()?;
        if self.athletes.iter().any(|a| a.id == athlete.id) {
            return Err(ValidationError::DuplicateAthlete(athlete.id).into());
        }
        obs::emit_roster_changed("append", &athlete.display_name(), self.athletes.len() + 1);
        self.athletes.push(athlete);
        Ok(())
    }

    /// Normalize and append a roster-file record.
    pub fn append_record(&mut self, record: AthleteRecord) -> Result<()> {
        self.append(record.into_athlete())
    }

    /// Remove the most recently appended athlete.
    pub fn remove_last(&mut self) -> Result<Athlete> {
        let athlete = self.athletes.pop().ok_or(PodiumError::EmptyStore)?;
        obs::emit_roster_changed("remove_last", &athlete.display_name(), self.athletes.len());
        Ok(athlete)
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    pub fn athletes(&self) -> &[Athlete] {
        &self.athletes
    }

    /// Freeze the current contents for a simulation run.
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            athletes: Arc::new(self.athletes.clone()),
        }
    }
}

/// Read-only view of a roster, cheap to clone and share across workers.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterSnapshot {
    athletes: Arc<Vec<Athlete>>,
}

impl RosterSnapshot {
    pub fn athletes(&self) -> &[Athlete] {
        &self.athletes
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    /// Sorted unique country codes.
    pub fn countries(&self) -> Vec<String> {
        self.athletes
            .iter()
            .map(|a| a.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// SHA-256 over ids, names, countries and exact score bits, in roster order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for athlete in self.athletes.iter() {
            hasher.update(athlete.id.0.as_bytes());
            for field in [&athlete.first_name, &athlete.last_name, &athlete.country] {
                hasher.update((field.len() as u64).to_le_bytes());
                hasher.update(field.as_bytes());
            }
            for (apparatus, score) in &athlete.scores {
                hasher.update(apparatus.code().as_bytes());
                hasher.update(score.to_bits().to_le_bytes());
            }
            hasher.update([0xff]);
        }
        hex::encode(hasher.finalize())
    }

    /// First id that appears more than once, if any.
    pub(crate) fn first_duplicate_id(&self) -> Option<AthleteId> {
        let mut seen = HashSet::with_capacity(self.athletes.len());
        self.athletes
            .iter()
            .find(|a| !seen.insert(a.id))
            .map(|a| a.id)
    }
}

impl From<Vec<Athlete>> for RosterSnapshot {
    fn from(athletes: Vec<Athlete>) -> Self {
        Self {
            athletes: Arc::new(athletes),
        }
    }
}
