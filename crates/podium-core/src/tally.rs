//! Per-athlete medal counters accumulated across trials.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::AthleteId;

/// Podium position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Medals in rank order: index 0 is first place.
    pub const ALL: [Medal; 3] = [Medal::Gold, Medal::Silver, Medal::Bronze];
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medal::Gold => f.write_str("gold"),
            Medal::Silver => f.write_str("silver"),
            Medal::Bronze => f.write_str("bronze"),
        }
    }
}

/// Gold/silver/bronze counts for one athlete.
///
/// Field order makes the derived ordering lexicographic on (gold, silver, bronze).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MedalCounts {
    pub gold: u64,
    pub silver: u64,
    pub bronze: u64,
}

impl MedalCounts {
    pub fn new(gold: u64, silver: u64, bronze: u64) -> Self {
        Self {
            gold,
            silver,
            bronze,
        }
    }

    pub fn get(&self, medal: Medal) -> u64 {
        match medal {
            Medal::Gold => self.gold,
            Medal::Silver => self.silver,
            Medal::Bronze => self.bronze,
        }
    }

    pub fn total(&self) -> u64 {
        self.gold + self.silver + self.bronze
    }

    fn increment(&mut self, medal: Medal) {
        match medal {
            Medal::Gold => self.gold += 1,
            Medal::Silver => self.silver += 1,
            Medal::Bronze => self.bronze += 1,
        }
    }

    fn add(&mut self, other: &MedalCounts) {
        self.gold += other.gold;
        self.silver += other.silver;
        self.bronze += other.bronze;
    }

    /// Descending medal-table order: more golds first, then silvers, then bronzes.
    pub fn table_cmp(&self, other: &MedalCounts) -> Ordering {
        other.cmp(self)
    }
}

/// Medal counters for every athlete in one simulation run.
///
/// Counters only ever increase. A tally belongs to exactly one run; workers in a
/// parallel run each own one and the results are combined with [`MedalTally::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedalTally {
    counts: BTreeMap<AthleteId, MedalCounts>,
}

impl MedalTally {
    /// A tally with a zeroed entry for each id.
    pub fn zeroed<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = AthleteId>,
    {
        Self {
            counts: ids
                .into_iter()
                .map(|id| (id, MedalCounts::default()))
                .collect(),
        }
    }

    /// Add one medal of the given colour to `athlete`.
    pub fn award(&mut self, athlete: AthleteId, medal: Medal) {
        self.counts.entry(athlete).or_default().increment(medal);
    }

    /// Counts for `athlete`; zero if never seen.
    pub fn counts(&self, athlete: &AthleteId) -> MedalCounts {
        self.counts.get(athlete).copied().unwrap_or_default()
    }

    /// Sum another tally into this one.
    pub fn merge(&mut self, other: &MedalTally) {
        for (id, counts) in &other.counts {
            self.counts.entry(*id).or_default().add(counts);
        }
    }

    /// Total medals handed out across all athletes and colours.
    pub fn total_awarded(&self) -> u64 {
        self.counts.values().map(MedalCounts::total).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AthleteId, &MedalCounts)> {
        self.counts.iter()
    }
}
