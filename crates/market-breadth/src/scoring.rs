//! Composite Scorer
//!
//! Long and short swing scores built from four components worth up to 25
//! points each. Each component is clamped to its own budget; the total is
//! left as the plain sum.

use analysis_core::ScoreBreakdown;

const COMPONENT_MAX: f64 = 25.0;

/// Sector breadth at which the long sector component saturates
const FULL_SECTOR_BREADTH: f64 = 60.0;

/// Long-side component breakdown.
///
/// Any NaN input zeroes its own component and leaves the others intact.
pub fn long_components(
    sector_breadth_pct: f64,
    days_since_cross: i64,
    pct_from_primary_sma: f64,
    pct_from_confirmation_sma: f64,
) -> ScoreBreakdown {
    ScoreBreakdown {
        sector: sector_strength(sector_breadth_pct),
        timing: freshness(days_since_cross),
        entry: entry_proximity(pct_from_primary_sma),
        confirmation: long_confirmation(pct_from_confirmation_sma),
    }
}

/// Long score in 0-100. Not clamped at the top.
pub fn score_long_candidate(
    sector_breadth_pct: f64,
    days_since_cross: i64,
    pct_from_primary_sma: f64,
    pct_from_confirmation_sma: f64,
) -> f64 {
    long_components(
        sector_breadth_pct,
        days_since_cross,
        pct_from_primary_sma,
        pct_from_confirmation_sma,
    )
    .total()
}

/// Short-side component breakdown.
///
/// `days_since_cross` is negative for a symbol that has been below its SMA
/// for that many days; zero or positive values earn no persistence credit.
pub fn short_components(
    sector_breadth_pct: f64,
    days_since_cross: i64,
    pct_from_primary_sma: f64,
    pct_from_confirmation_sma: f64,
) -> ScoreBreakdown {
    ScoreBreakdown {
        sector: sector_weakness(sector_breadth_pct),
        timing: persistence(days_since_cross),
        entry: breakdown_magnitude(pct_from_primary_sma),
        confirmation: short_confirmation(pct_from_confirmation_sma),
    }
}

/// Short score in 0-100.
pub fn score_short_candidate(
    sector_breadth_pct: f64,
    days_since_cross: i64,
    pct_from_primary_sma: f64,
    pct_from_confirmation_sma: f64,
) -> f64 {
    short_components(
        sector_breadth_pct,
        days_since_cross,
        pct_from_primary_sma,
        pct_from_confirmation_sma,
    )
    .total()
}

/// Map a score to 0-5 stars. Lower bounds are inclusive.
pub fn score_to_stars(score: f64) -> u8 {
    match score {
        s if s >= 80.0 => 5,
        s if s >= 65.0 => 4,
        s if s >= 50.0 => 3,
        s if s >= 35.0 => 2,
        s if s >= 20.0 => 1,
        _ => 0,
    }
}

fn sector_strength(breadth: f64) -> f64 {
    if breadth.is_nan() {
        return 0.0;
    }
    (breadth / FULL_SECTOR_BREADTH * COMPONENT_MAX).clamp(0.0, COMPONENT_MAX)
}

fn freshness(days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    (COMPONENT_MAX - (days - 1) as f64 * 1.5).max(0.0)
}

fn entry_proximity(pct: f64) -> f64 {
    if pct.is_nan() || pct <= 0.0 {
        return 0.0;
    }
    if pct <= 2.0 {
        COMPONENT_MAX
    } else if pct <= 5.0 {
        COMPONENT_MAX - (pct - 2.0) * 3.3
    } else if pct <= 10.0 {
        15.0 - (pct - 5.0) * 2.0
    } else {
        (5.0 - (pct - 10.0) * 0.5).max(0.0)
    }
}

fn long_confirmation(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    if pct > 0.0 {
        (15.0 + pct.min(10.0)).min(COMPONENT_MAX)
    } else if pct > -5.0 {
        10.0 + pct
    } else {
        (5.0 + pct / 2.0).max(0.0)
    }
}

fn sector_weakness(breadth: f64) -> f64 {
    if breadth.is_nan() {
        return 0.0;
    }
    (COMPONENT_MAX - breadth / 2.0).clamp(0.0, COMPONENT_MAX)
}

fn persistence(days: i64) -> f64 {
    if days >= 0 {
        return 0.0;
    }
    (days.unsigned_abs() as f64 * 0.4).min(COMPONENT_MAX)
}

fn breakdown_magnitude(pct: f64) -> f64 {
    if pct.is_nan() || pct >= 0.0 {
        return 0.0;
    }
    (pct.abs() * 0.8).min(COMPONENT_MAX)
}

fn short_confirmation(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    if pct < 0.0 {
        (15.0 + (-pct).min(10.0)).min(COMPONENT_MAX)
    } else if pct < 5.0 {
        10.0 - pct
    } else {
        (5.0 - pct / 2.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_long_setup() {
        let breakdown = long_components(60.0, 1, 1.0, 10.0);
        assert_relative_eq!(breakdown.sector, 25.0);
        assert_relative_eq!(breakdown.timing, 25.0);
        assert_relative_eq!(breakdown.entry, 25.0);
        assert_relative_eq!(breakdown.confirmation, 25.0);

        let score = score_long_candidate(60.0, 1, 1.0, 10.0);
        assert_relative_eq!(score, 100.0);
        assert_eq!(score_to_stars(score), 5);
    }

    #[test]
    fn test_sector_strength_is_monotonic_and_saturates() {
        let mut previous = -1.0;
        for step in 0..=60 {
            let component = long_components(step as f64, 0, 0.0, f64::NAN).sector;
            assert!(component >= previous);
            previous = component;
        }
        assert_relative_eq!(long_components(30.0, 0, 0.0, 0.0).sector, 12.5);
        for breadth in [60.0, 61.0, 75.5, 100.0] {
            assert_relative_eq!(long_components(breadth, 0, 0.0, 0.0).sector, 25.0);
        }
    }

    #[test]
    fn test_freshness_decay() {
        assert_relative_eq!(freshness(1), 25.0);
        assert_relative_eq!(freshness(5), 19.0);
        assert_relative_eq!(freshness(17), 1.0);
        assert_relative_eq!(freshness(18), 0.0);
        assert_relative_eq!(freshness(0), 0.0);
        assert_relative_eq!(freshness(-3), 0.0);
    }

    #[test]
    fn test_entry_proximity_bands() {
        assert_relative_eq!(entry_proximity(0.0), 0.0);
        assert_relative_eq!(entry_proximity(-1.0), 0.0);
        assert_relative_eq!(entry_proximity(2.0), 25.0);
        assert_relative_eq!(entry_proximity(4.0), 18.4, epsilon = 1e-9);
        assert_relative_eq!(entry_proximity(5.0), 15.1, epsilon = 1e-9);
        assert_relative_eq!(entry_proximity(7.5), 10.0);
        assert_relative_eq!(entry_proximity(10.0), 5.0);
        assert_relative_eq!(entry_proximity(14.0), 3.0);
        assert_relative_eq!(entry_proximity(25.0), 0.0);
    }

    #[test]
    fn test_long_confirmation_bands() {
        assert_relative_eq!(long_confirmation(3.0), 18.0);
        assert_relative_eq!(long_confirmation(40.0), 25.0);
        assert_relative_eq!(long_confirmation(0.0), 10.0);
        assert_relative_eq!(long_confirmation(-2.0), 8.0);
        assert_relative_eq!(long_confirmation(-5.0), 2.5);
        assert_relative_eq!(long_confirmation(-20.0), 0.0);
    }

    #[test]
    fn test_nan_inputs_zero_only_their_component() {
        let breakdown = long_components(f64::NAN, 1, f64::NAN, 10.0);
        assert_relative_eq!(breakdown.sector, 0.0);
        assert_relative_eq!(breakdown.entry, 0.0);
        assert_relative_eq!(breakdown.timing, 25.0);
        assert_relative_eq!(breakdown.confirmation, 25.0);
        assert_relative_eq!(score_long_candidate(f64::NAN, 1, f64::NAN, 10.0), 50.0);

        let short = short_components(f64::NAN, -10, -5.0, f64::NAN);
        assert_relative_eq!(short.total(), 4.0 + 4.0);
    }

    #[test]
    fn test_short_components() {
        let breakdown = short_components(10.0, -20, -12.0, -8.0);
        assert_relative_eq!(breakdown.sector, 20.0);
        assert_relative_eq!(breakdown.timing, 8.0);
        assert_relative_eq!(breakdown.entry, 9.6, epsilon = 1e-9);
        assert_relative_eq!(breakdown.confirmation, 23.0);

        let strongest = score_short_candidate(0.0, -100, -40.0, -15.0);
        assert_relative_eq!(strongest, 100.0);
        assert_eq!(score_to_stars(strongest), 5);
    }

    #[test]
    fn test_short_side_ignores_long_shaped_inputs() {
        let breakdown = short_components(80.0, 4, 3.0, 12.0);
        assert_relative_eq!(breakdown.sector, 0.0);
        assert_relative_eq!(breakdown.timing, 0.0);
        assert_relative_eq!(breakdown.entry, 0.0);
        assert_relative_eq!(breakdown.confirmation, 0.0);
        assert_relative_eq!(short_confirmation(2.0), 8.0);
    }

    #[test]
    fn test_star_boundaries() {
        assert_eq!(score_to_stars(79.999), 4);
        assert_eq!(score_to_stars(80.0), 5);
        assert_eq!(score_to_stars(65.0), 4);
        assert_eq!(score_to_stars(64.99), 3);
        assert_eq!(score_to_stars(50.0), 3);
        assert_eq!(score_to_stars(35.0), 2);
        assert_eq!(score_to_stars(20.0), 1);
        assert_eq!(score_to_stars(19.99), 0);
        assert_eq!(score_to_stars(f64::NAN), 0);
        assert_eq!(score_to_stars(104.0), 5);
    }
}
