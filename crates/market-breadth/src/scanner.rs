//! Swing candidate scanner
//!
//! Joins crossover/breakdown events with sector breadth and the
//! confirmation SMA, scores them and labels the setup.

use std::collections::HashMap;

use analysis_core::math::pct_from;
use analysis_core::{
    CandidateScore, CrossoverEvent, Direction, PriceSmaPoint, SectorBreadthPoint,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::crossover::{build_symbol_series, find_recent_breakdowns, find_recent_crossovers};
use crate::scoring::{long_components, score_to_stars, short_components};

/// Sector used for symbols missing from the membership map
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// Entry distance beyond which a setup is labelled extended
const EXTENDED_PCT: f64 = 10.0;

/// Everything a scan needs, already fetched.
#[derive(Debug, Clone, Copy)]
pub struct ScanInputs<'a> {
    /// Rows carrying the primary (signal) SMA
    pub primary: &'a [PriceSmaPoint],
    /// Rows carrying the longer confirmation SMA
    pub confirmation: &'a [PriceSmaPoint],
    pub membership: &'a HashMap<String, String>,
    /// Per-sector breadth on the primary SMA
    pub sector_breadth: &'a [SectorBreadthPoint],
    pub scanned_at: DateTime<Utc>,
}

/// Score every symbol that crossed above its primary SMA within
/// `lookback_days`. Best score first.
pub fn scan_long_candidates(inputs: &ScanInputs<'_>, lookback_days: i64) -> Vec<CandidateScore> {
    let events = find_recent_crossovers(&build_symbol_series(inputs.primary), lookback_days);
    score_events(inputs, &events, Direction::Long)
}

/// Score every symbol that broke below its primary SMA within
/// `lookback_days`. Best score first.
pub fn scan_short_candidates(inputs: &ScanInputs<'_>, lookback_days: i64) -> Vec<CandidateScore> {
    let events = find_recent_breakdowns(&build_symbol_series(inputs.primary), lookback_days);
    score_events(inputs, &events, Direction::Short)
}

fn score_events(
    inputs: &ScanInputs<'_>,
    events: &[CrossoverEvent],
    direction: Direction,
) -> Vec<CandidateScore> {
    let sector_pct = latest_pct_by_sector(inputs.sector_breadth);
    let confirmation = latest_distance_by_symbol(inputs.confirmation);

    let mut candidates: Vec<CandidateScore> = events
        .iter()
        .map(|event| {
            let sector = inputs
                .membership
                .get(&event.symbol)
                .map(String::as_str)
                .unwrap_or(UNKNOWN_SECTOR);
            let breadth = sector_pct.get(sector).copied().unwrap_or(f64::NAN);
            let confirmation_pct = confirmation.get(event.symbol.as_str()).copied();
            let confirmation_input = confirmation_pct.unwrap_or(f64::NAN);

            let breakdown = match direction {
                Direction::Long => long_components(
                    breadth,
                    event.days_since_cross,
                    event.pct_from_sma,
                    confirmation_input,
                ),
                Direction::Short => short_components(
                    breadth,
                    -event.days_since_cross,
                    event.pct_from_sma,
                    confirmation_input,
                ),
            };
            let score = breakdown.total();

            CandidateScore {
                symbol: event.symbol.clone(),
                sector: sector.to_string(),
                direction,
                score,
                stars: score_to_stars(score),
                setup_label: setup_label(direction, event.days_since_cross, event.pct_from_sma),
                breakdown,
                days_since_cross: event.days_since_cross,
                pct_from_primary_sma: event.pct_from_sma,
                pct_from_confirmation_sma: confirmation_pct,
                scanned_at: inputs.scanned_at,
            }
        })
        .collect();

    debug!("Scored {} {} candidates", candidates.len(), direction);

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    candidates
}

/// Short description of where the setup is in its move.
pub fn setup_label(direction: Direction, days_since_cross: i64, pct_from_sma: f64) -> String {
    let stage = match (direction, days_since_cross) {
        (Direction::Long, d) if d <= 3 => "Fresh Crossover",
        (Direction::Long, d) if d <= 10 => "Early Trend",
        (Direction::Long, _) => "Established Trend",
        (Direction::Short, d) if d <= 3 => "Fresh Breakdown",
        (Direction::Short, d) if d <= 10 => "Early Downtrend",
        (Direction::Short, _) => "Established Downtrend",
    };
    if pct_from_sma.abs() > EXTENDED_PCT {
        format!("{} (Extended)", stage)
    } else {
        stage.to_string()
    }
}

fn latest_pct_by_sector(points: &[SectorBreadthPoint]) -> HashMap<&str, f64> {
    let mut latest: HashMap<&str, (NaiveDate, f64)> = HashMap::new();
    for point in points {
        let entry = latest
            .entry(point.sector.as_str())
            .or_insert((point.date, point.pct_above));
        if point.date > entry.0 {
            *entry = (point.date, point.pct_above);
        }
    }
    latest.into_iter().map(|(sector, (_, pct))| (sector, pct)).collect()
}

fn latest_distance_by_symbol(points: &[PriceSmaPoint]) -> HashMap<&str, f64> {
    let mut latest: HashMap<&str, &PriceSmaPoint> = HashMap::new();
    for point in points.iter().filter(|p| p.sma.is_some()) {
        let entry = latest.entry(point.symbol.as_str()).or_insert(point);
        if point.date > entry.date {
            *entry = point;
        }
    }
    latest
        .into_iter()
        .filter_map(|(symbol, point)| {
            let sma = point.sma?;
            Some((symbol, pct_from(point.close, sma)?))
        })
        .collect()
}
