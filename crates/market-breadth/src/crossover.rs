//! Crossover / Leader Detector
//!
//! Finds the freshest SMA cross per symbol. Bullish crosses feed the
//! recovery-leader list and long scans; breakdowns feed short scans.

use std::collections::HashMap;

use analysis_core::math::pct_from;
use analysis_core::{CrossoverEvent, PriceSmaPoint, SymbolSeriesPoint};
use tracing::debug;

/// Per-symbol chronological series, keeping only rows that have an SMA.
pub fn build_symbol_series(points: &[PriceSmaPoint]) -> HashMap<String, Vec<SymbolSeriesPoint>> {
    let mut series: HashMap<String, Vec<SymbolSeriesPoint>> = HashMap::new();
    for point in points {
        if let Some(sma) = point.sma {
            series
                .entry(point.symbol.clone())
                .or_default()
                .push(SymbolSeriesPoint::new(point.date, point.close, sma));
        }
    }
    for rows in series.values_mut() {
        rows.sort_by_key(|p| p.date);
    }
    series
}

/// Symbols that crossed above their SMA within `lookback_days` and are still above.
///
/// Freshest cross first; among equally fresh crosses the one furthest above
/// its SMA ranks first.
pub fn find_recent_crossovers(
    series: &HashMap<String, Vec<SymbolSeriesPoint>>,
    lookback_days: i64,
) -> Vec<CrossoverEvent> {
    let mut events = detect(series, lookback_days, true);
    events.sort_by(|a, b| {
        a.days_since_cross
            .cmp(&b.days_since_cross)
            .then_with(|| b.pct_from_sma.total_cmp(&a.pct_from_sma))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    events
}

/// Symbols that fell below their SMA within `lookback_days` and are still below.
///
/// Freshest breakdown first, deepest below the SMA breaking ties.
pub fn find_recent_breakdowns(
    series: &HashMap<String, Vec<SymbolSeriesPoint>>,
    lookback_days: i64,
) -> Vec<CrossoverEvent> {
    let mut events = detect(series, lookback_days, false);
    events.sort_by(|a, b| {
        a.days_since_cross
            .cmp(&b.days_since_cross)
            .then_with(|| a.pct_from_sma.total_cmp(&b.pct_from_sma))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    events
}

fn detect(
    series: &HashMap<String, Vec<SymbolSeriesPoint>>,
    lookback_days: i64,
    bullish: bool,
) -> Vec<CrossoverEvent> {
    series
        .iter()
        .filter_map(|(symbol, rows)| last_cross(symbol, rows, lookback_days, bullish))
        .collect()
}

fn last_cross(
    symbol: &str,
    rows: &[SymbolSeriesPoint],
    lookback_days: i64,
    bullish: bool,
) -> Option<CrossoverEvent> {
    let mut ordered: Vec<&SymbolSeriesPoint> = rows.iter().collect();
    ordered.sort_by_key(|p| p.date);

    if ordered.len() < 2 {
        return None;
    }
    let latest = *ordered.last()?;
    if latest.above_sma != bullish {
        return None;
    }

    // last index where the state flips into the target side
    let cross_idx = (1..ordered.len())
        .rev()
        .find(|&i| ordered[i].above_sma == bullish && ordered[i - 1].above_sma != bullish)?;
    let cross_date = ordered[cross_idx].date;

    let days_since_cross = (latest.date - cross_date).num_days();
    if days_since_cross > lookback_days {
        return None;
    }

    let Some(pct_from_sma) = pct_from(latest.close, latest.sma) else {
        debug!("Skipping {}: SMA is zero on {}", symbol, latest.date);
        return None;
    };

    Some(CrossoverEvent {
        symbol: symbol.to_string(),
        cross_date,
        days_since_cross,
        current_price: latest.close,
        sma_value: latest.sma,
        pct_from_sma,
        still_above: latest.above_sma,
    })
}
