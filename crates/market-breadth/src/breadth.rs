//! Breadth Calculator
//!
//! Percentage of constituents closing strictly above their SMA, per
//! `(date, sector)` and for the whole universe.

use std::collections::{BTreeMap, HashMap};

use analysis_core::math::pct_of;
use analysis_core::{PriceSmaPoint, SectorBreadthPoint, MARKET_SECTOR};
use chrono::NaiveDate;
use tracing::debug;

#[derive(Default)]
struct Tally {
    above: usize,
    total: usize,
}

/// Group `points` by `(date, sector)` and count how many sit above their SMA.
///
/// Symbols missing from `membership` and rows without an SMA are skipped.
/// Output is ordered by `(date, sector)` regardless of input order.
pub fn compute_sector_breadth(
    points: &[PriceSmaPoint],
    membership: &HashMap<String, String>,
) -> Vec<SectorBreadthPoint> {
    let mut unmapped = 0usize;
    let breadth = aggregate(points, |symbol| {
        let sector = membership.get(symbol).map(String::as_str);
        if sector.is_none() {
            unmapped += 1;
        }
        sector
    });
    if unmapped > 0 {
        debug!("Dropped {} rows with no sector mapping", unmapped);
    }
    breadth
}

/// Market-wide breadth: the whole universe as sector `"ALL"`.
pub fn compute_market_breadth(points: &[PriceSmaPoint]) -> Vec<SectorBreadthPoint> {
    aggregate(points, |_| Some(MARKET_SECTOR))
}

fn aggregate<'a, F>(points: &'a [PriceSmaPoint], mut sector_of: F) -> Vec<SectorBreadthPoint>
where
    F: FnMut(&'a str) -> Option<&'a str>,
{
    let mut groups: BTreeMap<(NaiveDate, &'a str), Tally> = BTreeMap::new();

    for point in points {
        let Some(above) = point.above_sma() else {
            continue;
        };
        let Some(sector) = sector_of(point.symbol.as_str()) else {
            continue;
        };
        let tally = groups.entry((point.date, sector)).or_default();
        tally.total += 1;
        if above {
            tally.above += 1;
        }
    }

    groups
        .into_iter()
        .filter_map(|((date, sector), tally)| {
            let pct_above = pct_of(tally.above, tally.total)?;
            Some(SectorBreadthPoint {
                date,
                sector: sector.to_string(),
                stocks_above: tally.above,
                total_stocks: tally.total,
                pct_above,
            })
        })
        .collect()
}

/// Rows for a single date.
pub fn breadth_at(points: &[SectorBreadthPoint], date: NaiveDate) -> Vec<SectorBreadthPoint> {
    points.iter().filter(|p| p.date == date).cloned().collect()
}

/// Rows for the most recent date present.
pub fn latest_breadth(points: &[SectorBreadthPoint]) -> Vec<SectorBreadthPoint> {
    match points.iter().map(|p| p.date).max() {
        Some(latest) => breadth_at(points, latest),
        None => Vec::new(),
    }
}
