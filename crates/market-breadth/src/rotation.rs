//! Sector Rotation
//!
//! Ranks sectors by breadth, measures breadth momentum over a lag of
//! observed dates, and flags risk-on / risk-off rotation between cyclical
//! and defensive groups.

use std::collections::{BTreeSet, HashMap};

use analysis_core::math::round2;
use analysis_core::SectorBreadthPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::breadth::breadth_at;
use crate::relative_strength::compute_relative_strength;

/// Breadth change of a sector over the lag window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorMomentum {
    pub sector: String,
    /// Percentage-point change in `pct_above`
    pub momentum: f64,
    pub current_pct_above: f64,
    pub previous_pct_above: f64,
}

/// One line of the rotation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummaryRow {
    /// 1-based
    pub rank: usize,
    pub sector: String,
    pub stocks_above: usize,
    pub total_stocks: usize,
    pub pct_above: f64,
    /// `None` when the market has no reading on the same date
    pub relative_strength: Option<f64>,
    /// `None` when there is not enough history for the lag
    pub momentum: Option<f64>,
}

/// Sector table as of the latest date in the data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationSummary {
    pub as_of: NaiveDate,
    pub market: Option<SectorBreadthPoint>,
    pub rows: Vec<SectorSummaryRow>,
    pub lag_days: usize,
    pub signal: RotationSignal,
}

/// Direction of money moving between sector groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationType {
    /// Breadth improving faster in cyclicals than defensives
    RiskOn,
    /// Breadth improving faster in defensives than cyclicals
    RiskOff,
    None,
}

impl RotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationType::RiskOn => "Risk-On (Defensive → Cyclical)",
            RotationType::RiskOff => "Risk-Off (Cyclical → Defensive)",
            RotationType::None => "No Clear Rotation",
        }
    }
}

impl std::fmt::Display for RotationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of comparing group momentum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSignal {
    pub rotation_type: RotationType,
    pub cyclical_momentum: f64,
    pub defensive_momentum: f64,
    /// Absolute spread between the groups, in breadth points
    pub strength: f64,
    pub gaining_sectors: Vec<String>,
    pub losing_sectors: Vec<String>,
}

/// Sort sectors by `pct_above` descending, sector name ascending on ties.
pub fn rank_sectors(points: &[SectorBreadthPoint]) -> Vec<SectorBreadthPoint> {
    let mut ranked = points.to_vec();
    ranked.sort_by(|a, b| {
        b.pct_above
            .total_cmp(&a.pct_above)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    ranked
}

/// `pct_above` on the latest date minus `pct_above` `lag_days` observations
/// earlier.
///
/// The lag counts distinct dates present in `series`, not calendar days.
/// Returns nothing when fewer than `lag_days + 1` dates exist; a sector
/// without a reading on either end date is left out.
pub fn compute_momentum(series: &[SectorBreadthPoint], lag_days: usize) -> Vec<SectorMomentum> {
    let dates: Vec<NaiveDate> = series
        .iter()
        .map(|p| p.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if lag_days >= dates.len() {
        return Vec::new();
    }
    let latest = dates[dates.len() - 1];
    let base = dates[dates.len() - 1 - lag_days];

    let lookup: HashMap<(&str, NaiveDate), f64> = series
        .iter()
        .map(|p| ((p.sector.as_str(), p.date), p.pct_above))
        .collect();
    let sectors: BTreeSet<&str> = series.iter().map(|p| p.sector.as_str()).collect();

    let mut momentum: Vec<SectorMomentum> = sectors
        .into_iter()
        .filter_map(|sector| {
            let current = *lookup.get(&(sector, latest))?;
            let previous = *lookup.get(&(sector, base))?;
            Some(SectorMomentum {
                sector: sector.to_string(),
                momentum: round2(current - previous),
                current_pct_above: current,
                previous_pct_above: previous,
            })
        })
        .collect();

    momentum.sort_by(|a, b| {
        b.momentum
            .total_cmp(&a.momentum)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    momentum
}

/// Rotation table with the default sector groups.
pub fn build_rotation_summary(
    sector_series: &[SectorBreadthPoint],
    market_series: &[SectorBreadthPoint],
    lag_days: usize,
) -> Option<RotationSummary> {
    RotationDetector::default().summarize(sector_series, market_series, lag_days)
}

/// Detects cyclical/defensive rotation from breadth momentum
#[derive(Debug, Clone)]
pub struct RotationDetector {
    cyclical_sectors: Vec<String>,
    defensive_sectors: Vec<String>,
    /// Minimum momentum spread between groups to report a rotation
    threshold: f64,
}

impl Default for RotationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationDetector {
    /// Detector using NSE industry names for the groups.
    pub fn new() -> Self {
        Self {
            cyclical_sectors: vec![
                "Automobile and Auto Components".to_string(),
                "Capital Goods".to_string(),
                "Construction".to_string(),
                "Financial Services".to_string(),
                "Metals & Mining".to_string(),
                "Realty".to_string(),
            ],
            defensive_sectors: vec![
                "Fast Moving Consumer Goods".to_string(),
                "Healthcare".to_string(),
                "Power".to_string(),
                "Telecommunication".to_string(),
            ],
            threshold: 5.0,
        }
    }

    pub fn with_groups(cyclical: Vec<String>, defensive: Vec<String>, threshold: f64) -> Self {
        Self {
            cyclical_sectors: cyclical,
            defensive_sectors: defensive,
            threshold,
        }
    }

    /// Same groups, different minimum spread.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Compare the average momentum of the two groups.
    pub fn detect(&self, momentum: &[SectorMomentum]) -> RotationSignal {
        let cyclical = self.average_momentum(momentum, &self.cyclical_sectors);
        let defensive = self.average_momentum(momentum, &self.defensive_sectors);

        let (Some(cyclical_momentum), Some(defensive_momentum)) = (cyclical, defensive) else {
            return RotationSignal {
                rotation_type: RotationType::None,
                cyclical_momentum: cyclical.unwrap_or(0.0),
                defensive_momentum: defensive.unwrap_or(0.0),
                strength: 0.0,
                gaining_sectors: Vec::new(),
                losing_sectors: Vec::new(),
            };
        };

        let diff = cyclical_momentum - defensive_momentum;
        let rotation_type = if diff.abs() < self.threshold {
            RotationType::None
        } else if diff > 0.0 {
            RotationType::RiskOn
        } else {
            RotationType::RiskOff
        };

        let (gaining, losing) = match rotation_type {
            RotationType::RiskOn => (&self.cyclical_sectors, &self.defensive_sectors),
            RotationType::RiskOff => (&self.defensive_sectors, &self.cyclical_sectors),
            RotationType::None => {
                return RotationSignal {
                    rotation_type,
                    cyclical_momentum,
                    defensive_momentum,
                    strength: round2(diff.abs()),
                    gaining_sectors: Vec::new(),
                    losing_sectors: Vec::new(),
                }
            }
        };

        RotationSignal {
            rotation_type,
            cyclical_momentum,
            defensive_momentum,
            strength: round2(diff.abs()),
            gaining_sectors: Self::present(momentum, gaining),
            losing_sectors: Self::present(momentum, losing),
        }
    }

    /// Rotation table as of the latest sector date.
    pub fn summarize(
        &self,
        sector_series: &[SectorBreadthPoint],
        market_series: &[SectorBreadthPoint],
        lag_days: usize,
    ) -> Option<RotationSummary> {
        let as_of = sector_series.iter().map(|p| p.date).max()?;

        let ranked = rank_sectors(&breadth_at(sector_series, as_of));
        let market = market_series.iter().find(|p| p.date == as_of).cloned();
        let relative: HashMap<String, f64> = compute_relative_strength(&ranked, market_series)
            .into_iter()
            .map(|p| (p.sector, p.relative_strength))
            .collect();
        let momentum = compute_momentum(sector_series, lag_days);
        let momentum_by_sector: HashMap<&str, f64> = momentum
            .iter()
            .map(|m| (m.sector.as_str(), m.momentum))
            .collect();

        let rows = ranked
            .into_iter()
            .enumerate()
            .map(|(i, point)| SectorSummaryRow {
                rank: i + 1,
                relative_strength: relative.get(&point.sector).copied(),
                momentum: momentum_by_sector.get(point.sector.as_str()).copied(),
                sector: point.sector,
                stocks_above: point.stocks_above,
                total_stocks: point.total_stocks,
                pct_above: point.pct_above,
            })
            .collect();

        Some(RotationSummary {
            as_of,
            market,
            rows,
            lag_days,
            signal: self.detect(&momentum),
        })
    }

    fn average_momentum(&self, momentum: &[SectorMomentum], sectors: &[String]) -> Option<f64> {
        let relevant: Vec<f64> = momentum
            .iter()
            .filter(|m| sectors.contains(&m.sector))
            .map(|m| m.momentum)
            .collect();

        if relevant.is_empty() {
            None
        } else {
            Some(round2(relevant.iter().sum::<f64>() / relevant.len() as f64))
        }
    }

    fn present(momentum: &[SectorMomentum], sectors: &[String]) -> Vec<String> {
        momentum
            .iter()
            .filter(|m| sectors.contains(&m.sector))
            .map(|m| m.sector.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::MARKET_SECTOR;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn point(date: NaiveDate, sector: &str, pct_above: f64) -> SectorBreadthPoint {
        SectorBreadthPoint {
            date,
            sector: sector.to_string(),
            stocks_above: (pct_above / 10.0) as usize,
            total_stocks: 10,
            pct_above,
        }
    }

    #[test]
    fn test_rank_sectors_ties_by_name() {
        let points = vec![
            point(d(3), "Realty", 40.0),
            point(d(3), "Healthcare", 70.0),
            point(d(3), "Capital Goods", 70.0),
            point(d(3), "Power", 10.0),
        ];
        let ranked: Vec<_> = rank_sectors(&points).into_iter().map(|p| p.sector).collect();
        assert_eq!(ranked, vec!["Capital Goods", "Healthcare", "Realty", "Power"]);
    }

    #[test]
    fn test_momentum_uses_observed_dates() {
        // the 4th is missing; a lag of 2 from the 6th lands on the 3rd
        let series = vec![
            point(d(2), "Realty", 20.0),
            point(d(3), "Realty", 30.0),
            point(d(5), "Realty", 35.0),
            point(d(6), "Realty", 50.0),
            point(d(3), "Power", 60.0),
            point(d(6), "Power", 45.5),
        ];
        let momentum = compute_momentum(&series, 2);
        assert_eq!(momentum.len(), 2);
        assert_eq!(momentum[0].sector, "Realty");
        assert_relative_eq!(momentum[0].momentum, 20.0);
        assert_relative_eq!(momentum[0].previous_pct_above, 30.0);
        assert_eq!(momentum[1].sector, "Power");
        assert_relative_eq!(momentum[1].momentum, -14.5);
    }

    #[test]
    fn test_momentum_needs_enough_dates() {
        let series = vec![point(d(2), "Realty", 20.0), point(d(3), "Realty", 30.0)];
        assert!(compute_momentum(&series, 2).is_empty());
        assert_eq!(compute_momentum(&series, 1).len(), 1);
    }

    #[test]
    fn test_momentum_with_huge_lag_is_empty() {
        let series = vec![point(d(2), "Realty", 20.0), point(d(3), "Realty", 30.0)];
        assert!(compute_momentum(&series, usize::MAX).is_empty());
        assert!(compute_momentum(&[], usize::MAX).is_empty());
        assert!(build_rotation_summary(&series, &[], usize::MAX)
            .unwrap()
            .rows
            .iter()
            .all(|r| r.momentum.is_none()));
    }

    #[test]
    fn test_momentum_omits_sector_missing_an_end() {
        let series = vec![
            point(d(2), "Realty", 20.0),
            point(d(3), "Realty", 30.0),
            point(d(3), "Power", 30.0),
        ];
        let momentum = compute_momentum(&series, 1);
        assert_eq!(momentum.len(), 1);
        assert_eq!(momentum[0].sector, "Realty");
    }

    #[test]
    fn test_detects_risk_on() {
        let momentum = vec![
            SectorMomentum { sector: "Realty".into(), momentum: 15.0, current_pct_above: 60.0, previous_pct_above: 45.0 },
            SectorMomentum { sector: "Capital Goods".into(), momentum: 9.0, current_pct_above: 50.0, previous_pct_above: 41.0 },
            SectorMomentum { sector: "Healthcare".into(), momentum: -4.0, current_pct_above: 40.0, previous_pct_above: 44.0 },
        ];
        let signal = RotationDetector::new().detect(&momentum);
        assert_eq!(signal.rotation_type, RotationType::RiskOn);
        assert_relative_eq!(signal.cyclical_momentum, 12.0);
        assert_relative_eq!(signal.strength, 16.0);
        assert_eq!(signal.gaining_sectors, vec!["Realty", "Capital Goods"]);
        assert_eq!(signal.losing_sectors, vec!["Healthcare"]);
    }

    #[test]
    fn test_small_spread_is_no_rotation() {
        let detector = RotationDetector::with_groups(vec!["A".into()], vec!["B".into()], 5.0);
        let momentum = vec![
            SectorMomentum { sector: "A".into(), momentum: 2.0, current_pct_above: 0.0, previous_pct_above: 0.0 },
            SectorMomentum { sector: "B".into(), momentum: -1.0, current_pct_above: 0.0, previous_pct_above: 0.0 },
        ];
        assert_eq!(detector.detect(&momentum).rotation_type, RotationType::None);
        assert_eq!(detector.detect(&[]).rotation_type, RotationType::None);

        let sensitive = detector.with_threshold(2.0);
        let signal = sensitive.detect(&momentum);
        assert_eq!(signal.rotation_type, RotationType::RiskOn);
        assert_eq!(signal.rotation_type.to_string(), "Risk-On (Defensive → Cyclical)");
        assert_eq!(signal.gaining_sectors, vec!["A"]);
    }

    #[test]
    fn test_summary_as_of_latest_date() {
        let sectors = vec![
            point(d(2), "Realty", 20.0),
            point(d(2), "Power", 60.0),
            point(d(3), "Realty", 70.0),
            point(d(3), "Power", 50.0),
        ];
        let market = vec![point(d(2), MARKET_SECTOR, 40.0), point(d(3), MARKET_SECTOR, 60.0)];

        let summary = build_rotation_summary(&sectors, &market, 1).unwrap();
        assert_eq!(summary.as_of, d(3));
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].rank, 1);
        assert_eq!(summary.rows[0].sector, "Realty");
        assert_eq!(summary.rows[0].relative_strength, Some(10.0));
        assert_eq!(summary.rows[0].momentum, Some(50.0));
        assert_eq!(summary.rows[1].relative_strength, Some(-10.0));
        assert_eq!(summary.rows[1].momentum, Some(-10.0));
        assert_eq!(summary.market.unwrap().pct_above, 60.0);

        let without_history = build_rotation_summary(&sectors, &[], 5).unwrap();
        assert!(without_history.rows.iter().all(|r| r.momentum.is_none() && r.relative_strength.is_none()));
        assert!(build_rotation_summary(&[], &market, 1).is_none());
    }
}
