//! Star-rating buckets for building swing portfolios.

use std::collections::BTreeMap;

use analysis_core::{CandidateScore, Direction};
use serde::{Deserialize, Serialize};

/// Candidates sharing a direction and star rating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarBucket {
    /// e.g. "Swing Long - Rate 5"
    pub name: String,
    pub direction: Direction,
    pub stars: u8,
    pub candidates: Vec<CandidateScore>,
}

impl StarBucket {
    pub fn bucket_name(direction: Direction, stars: u8) -> String {
        format!("Swing {} - Rate {}", direction, stars)
    }
}

/// Group rated candidates into one bucket per `(direction, stars)` for 1-5
/// stars. Unrated candidates are left out. Buckets come back Long before
/// Short, highest rating first; candidates keep their input order.
pub fn bucket_by_stars(candidates: &[CandidateScore]) -> Vec<StarBucket> {
    let mut groups: BTreeMap<(Direction, std::cmp::Reverse<u8>), Vec<CandidateScore>> =
        BTreeMap::new();

    for candidate in candidates.iter().filter(|c| (1..=5).contains(&c.stars)) {
        groups
            .entry((candidate.direction, std::cmp::Reverse(candidate.stars)))
            .or_default()
            .push(candidate.clone());
    }

    groups
        .into_iter()
        .map(|((direction, std::cmp::Reverse(stars)), candidates)| StarBucket {
            name: StarBucket::bucket_name(direction, stars),
            direction,
            stars,
            candidates,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::ScoreBreakdown;
    use chrono::Utc;

    fn candidate(symbol: &str, direction: Direction, stars: u8) -> CandidateScore {
        CandidateScore {
            symbol: symbol.to_string(),
            sector: "Realty".to_string(),
            direction,
            score: stars as f64 * 16.0,
            stars,
            setup_label: "Fresh Crossover".to_string(),
            breakdown: ScoreBreakdown::default(),
            days_since_cross: 1,
            pct_from_primary_sma: 1.0,
            pct_from_confirmation_sma: None,
            scanned_at: Utc::now(),
        }
    }

    #[test]
    fn test_buckets_named_and_ordered() {
        let candidates = vec![
            candidate("A", Direction::Long, 3),
            candidate("B", Direction::Short, 5),
            candidate("C", Direction::Long, 5),
            candidate("D", Direction::Long, 3),
            candidate("E", Direction::Long, 0),
        ];
        let buckets = bucket_by_stars(&candidates);
        let names: Vec<_> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Swing Long - Rate 5", "Swing Long - Rate 3", "Swing Short - Rate 5"]
        );

        let rate3: Vec<_> = buckets[1].candidates.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(rate3, vec!["A", "D"]);
        assert!(buckets.iter().all(|b| b.candidates.iter().all(|c| c.stars == b.stars)));
    }

    #[test]
    fn test_unrated_only_yields_no_buckets() {
        assert!(bucket_by_stars(&[candidate("E", Direction::Short, 0)]).is_empty());
        assert!(bucket_by_stars(&[]).is_empty());
    }
}
