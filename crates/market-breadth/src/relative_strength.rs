//! Relative Strength Calculator
//!
//! Sector breadth minus market breadth, and the views around a market
//! breadth trough used to find sectors that held up at the low.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use analysis_core::math::round2;
use analysis_core::{RelativeStrengthPoint, SectorBreadthPoint};
use chrono::NaiveDate;

/// Join sector breadth to market breadth on the exact date.
///
/// Sector points without a market point on the same date are omitted.
pub fn compute_relative_strength(
    sector_points: &[SectorBreadthPoint],
    market_points: &[SectorBreadthPoint],
) -> Vec<RelativeStrengthPoint> {
    let market_by_date: HashMap<NaiveDate, f64> = market_points
        .iter()
        .map(|p| (p.date, p.pct_above))
        .collect();

    let mut points: Vec<RelativeStrengthPoint> = sector_points
        .iter()
        .filter(|p| !p.is_market())
        .filter_map(|p| {
            let market_pct = *market_by_date.get(&p.date)?;
            Some(RelativeStrengthPoint {
                date: p.date,
                sector: p.sector.clone(),
                sector_pct_above: p.pct_above,
                market_pct_above: market_pct,
                relative_strength: round2(p.pct_above - market_pct),
            })
        })
        .collect();

    points.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.sector.cmp(&b.sector)));
    points
}

fn by_strength_desc(a: &RelativeStrengthPoint, b: &RelativeStrengthPoint) -> Ordering {
    b.relative_strength
        .total_cmp(&a.relative_strength)
        .then_with(|| a.sector.cmp(&b.sector))
        .then_with(|| a.date.cmp(&b.date))
}

fn within_window(date: NaiveDate, trough_date: NaiveDate, window_days: i64) -> bool {
    (date - trough_date).num_days().abs() <= window_days
}

/// Every point within `±window_days` calendar days of `trough_date`,
/// strongest first.
pub fn relative_strength_window(
    points: &[RelativeStrengthPoint],
    trough_date: NaiveDate,
    window_days: i64,
) -> Vec<RelativeStrengthPoint> {
    let mut window: Vec<RelativeStrengthPoint> = points
        .iter()
        .filter(|p| within_window(p.date, trough_date, window_days))
        .cloned()
        .collect();
    window.sort_by(by_strength_desc);
    window
}

/// One point per sector describing its relative strength at the trough.
///
/// Uses the point on `trough_date` when the sector has one; otherwise the
/// point nearest the middle of the sector's dates inside the window, earliest
/// date winning a tie. Strongest sector first.
pub fn sector_strength_at_trough(
    points: &[RelativeStrengthPoint],
    trough_date: NaiveDate,
    window_days: i64,
) -> Vec<RelativeStrengthPoint> {
    let mut by_sector: BTreeMap<&str, Vec<&RelativeStrengthPoint>> = BTreeMap::new();
    for point in points
        .iter()
        .filter(|p| within_window(p.date, trough_date, window_days))
    {
        by_sector.entry(point.sector.as_str()).or_default().push(point);
    }

    let mut selected: Vec<RelativeStrengthPoint> = by_sector
        .into_values()
        .filter_map(|candidates| {
            if let Some(exact) = candidates.iter().find(|p| p.date == trough_date) {
                return Some((*exact).clone());
            }
            let first = candidates.iter().map(|p| p.date).min()?;
            let last = candidates.iter().map(|p| p.date).max()?;
            let span = (last - first).num_days();
            // distance to the midpoint, doubled to stay in whole days
            candidates
                .iter()
                .min_by_key(|p| ((2 * (p.date - first).num_days() - span).abs(), p.date))
                .map(|p| (*p).clone())
        })
        .collect();

    selected.sort_by(by_strength_desc);
    selected
}

/// Date of the lowest market breadth reading, earliest on ties.
pub fn find_breadth_trough(market_points: &[SectorBreadthPoint]) -> Option<NaiveDate> {
    market_points
        .iter()
        .filter(|p| p.pct_above.is_finite())
        .min_by(|a, b| a.pct_above.total_cmp(&b.pct_above).then_with(|| a.date.cmp(&b.date)))
        .map(|p| p.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::MARKET_SECTOR;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn breadth(date: NaiveDate, sector: &str, pct_above: f64) -> SectorBreadthPoint {
        SectorBreadthPoint {
            date,
            sector: sector.to_string(),
            stocks_above: 0,
            total_stocks: 10,
            pct_above,
        }
    }

    fn rs(date: NaiveDate, sector: &str, relative_strength: f64) -> RelativeStrengthPoint {
        RelativeStrengthPoint {
            date,
            sector: sector.to_string(),
            sector_pct_above: 50.0 + relative_strength,
            market_pct_above: 50.0,
            relative_strength,
        }
    }

    #[test]
    fn test_inner_join_on_date() {
        let sectors = vec![
            breadth(d(1), "NIFTY IT", 70.0),
            breadth(d(2), "NIFTY IT", 40.1),
            breadth(d(3), "NIFTY IT", 55.0),
            breadth(d(2), "NIFTY BANK", 20.0),
        ];
        let market = vec![breadth(d(1), MARKET_SECTOR, 50.0), breadth(d(2), MARKET_SECTOR, 40.4)];

        let result = compute_relative_strength(&sectors, &market);

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|p| p.date != d(3)));
        assert_eq!(result[0].sector, "NIFTY IT");
        assert_relative_eq!(result[0].relative_strength, 20.0);
        let bank = result.iter().find(|p| p.sector == "NIFTY BANK").unwrap();
        assert_relative_eq!(bank.relative_strength, -20.4);
        let it_day2 = result.iter().find(|p| p.sector == "NIFTY IT" && p.date == d(2)).unwrap();
        assert_relative_eq!(it_day2.relative_strength, -0.3);
    }

    #[test]
    fn test_no_market_points_yields_nothing() {
        let sectors = vec![breadth(d(1), "NIFTY IT", 70.0)];
        assert!(compute_relative_strength(&sectors, &[]).is_empty());
    }

    #[test]
    fn test_window_sorted_strongest_first() {
        let points = vec![
            rs(d(1), "A", 5.0),
            rs(d(8), "B", 1.0),
            rs(d(9), "B", -2.0),
            rs(d(10), "A", 12.0),
            rs(d(11), "C", 3.0),
            rs(d(20), "C", 40.0),
        ];
        let window = relative_strength_window(&points, d(10), 2);
        let order: Vec<_> = window.iter().map(|p| (p.sector.as_str(), p.date)).collect();
        assert_eq!(order, vec![("A", d(10)), ("C", d(11)), ("B", d(8)), ("B", d(9))]);
    }

    #[test]
    fn test_trough_prefers_exact_date() {
        let points = vec![rs(d(9), "A", 30.0), rs(d(10), "A", 2.0), rs(d(11), "A", 25.0)];
        let at_trough = sector_strength_at_trough(&points, d(10), 3);
        assert_eq!(at_trough.len(), 1);
        assert_eq!(at_trough[0].date, d(10));
        assert_relative_eq!(at_trough[0].relative_strength, 2.0);
    }

    #[test]
    fn test_trough_falls_back_to_window_midpoint() {
        // B has no point on the 10th; its dates 7..11 have midpoint the 9th
        let points = vec![
            rs(d(7), "B", 1.0),
            rs(d(9), "B", 4.0),
            rs(d(11), "B", 9.0),
            rs(d(10), "A", 2.0),
        ];
        let at_trough = sector_strength_at_trough(&points, d(10), 3);
        assert_eq!(at_trough.len(), 2);
        assert_eq!(at_trough[0].sector, "B");
        assert_eq!(at_trough[0].date, d(9));
        assert_eq!(at_trough[1].sector, "A");
    }

    #[test]
    fn test_trough_midpoint_tie_takes_earliest() {
        // dates 8 and 9 around a 8.5 midpoint
        let points = vec![rs(d(9), "B", 4.0), rs(d(8), "B", 1.0)];
        let at_trough = sector_strength_at_trough(&points, d(12), 5);
        assert_eq!(at_trough[0].date, d(8));
    }

    #[test]
    fn test_find_breadth_trough() {
        let market = vec![
            breadth(d(1), MARKET_SECTOR, 45.0),
            breadth(d(2), MARKET_SECTOR, 21.5),
            breadth(d(3), MARKET_SECTOR, 30.0),
            breadth(d(4), MARKET_SECTOR, 21.5),
        ];
        assert_eq!(find_breadth_trough(&market), Some(d(2)));
        assert_eq!(find_breadth_trough(&[]), None);
    }
}
