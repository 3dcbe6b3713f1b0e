//! Per-country view of a medal table.

use crate::domain::athlete::normalize_country;
use crate::driver::{SimulationOutcome, Standing};

/// Standings for athletes from `country`, sorted like the driver's medal
/// table: gold, silver, bronze descending, then canonical identity.
///
/// The query is uppercased before comparing; stored countries are compared
/// as-is. `limit` keeps only the first `n` rows.
pub fn medals_for_country<'a>(
    standings: &'a [Standing],
    country: &str,
    limit: Option<usize>,
) -> Vec<&'a Standing> {
    let country = normalize_country(country);
    let mut rows: Vec<&Standing> = standings
        .iter()
        .filter(|s| s.athlete.country == country)
        .collect();
    rows.sort_by(|a, b| {
        a.medals
            .table_cmp(&b.medals)
            .then_with(|| a.athlete.canonical_cmp(&b.athlete))
    });
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

impl SimulationOutcome {
    /// [`medals_for_country`] over this outcome's standings.
    pub fn for_country(&self, country: &str, limit: Option<usize>) -> Vec<&Standing> {
        medals_for_country(&self.standings, country, limit)
    }
}
