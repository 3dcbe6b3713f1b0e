//! Deterministic ranking of noisy scores and podium selection.

use crate::roster::RosterSnapshot;
use crate::tally::Medal;
use crate::trial::NoisyScore;

/// Number of podium places awarded per apparatus.
pub const PODIUM_PLACES: usize = 3;

/// Sort scores best-first.
///
/// Scores compare with IEEE total ordering; equal scores fall back to the
/// athletes' canonical identity order, so the result is a total order.
pub fn rank(roster: &RosterSnapshot, mut scores: Vec<NoisyScore>) -> Vec<NoisyScore> {
    let athletes = roster.athletes();
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| athletes[a.athlete].canonical_cmp(&athletes[b.athlete]))
    });
    scores
}

/// Pair the first (up to) three ranked entries with their medals.
///
/// Fewer than three entries yield fewer medals; nothing is fabricated.
pub fn podium(ranking: &[NoisyScore]) -> impl Iterator<Item = (Medal, &NoisyScore)> + '_ {
    Medal::ALL.into_iter().zip(ranking.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Athlete;

    fn roster() -> RosterSnapshot {
        RosterSnapshot::from(vec![
            Athlete::new("Zoe", "Young", "USA"),
            Athlete::new("Amy", "Adams", "USA"),
            Athlete::new("Max", "Moss", "GBR"),
            Athlete::new("Ann", "Adams", "USA"),
        ])
    }

    fn entry(athlete: usize, score: f64) -> NoisyScore {
        NoisyScore { athlete, score }
    }

    #[test]
    fn test_rank_orders_descending() {
        let ranked = rank(
            &roster(),
            vec![entry(0, 13.9), entry(1, 14.7), entry(2, 14.2)],
        );
        let order: Vec<usize> = ranked.iter().map(|e| e.athlete).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_break_by_canonical_identity() {
        let roster = roster();
        // Adams/Amy < Adams/Ann < Moss < Young
        let ranked = rank(
            &roster,
            vec![entry(0, 14.0), entry(3, 14.0), entry(2, 14.0), entry(1, 14.0)],
        );
        let order: Vec<usize> = ranked.iter().map(|e| e.athlete).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_podium_with_two_entries_awards_no_bronze() {
        let ranking = vec![entry(1, 15.0), entry(0, 14.0)];
        let medals: Vec<(Medal, usize)> = podium(&ranking).map(|(m, e)| (m, e.athlete)).collect();
        assert_eq!(medals, vec![(Medal::Gold, 1), (Medal::Silver, 0)]);
    }

    #[test]
    fn test_podium_caps_at_three() {
        let ranking: Vec<NoisyScore> = (0..4).map(|i| entry(i, 15.0 - i as f64)).collect();
        assert_eq!(podium(&ranking).count(), PODIUM_PLACES);
        assert_eq!(podium(&[]).count(), 0);
    }
}
