//! Breadth Service
//!
//! Fetches rows from a [`MarketDataSource`] once per request and runs the
//! pure breadth / scoring functions over them. Data-source failures are the
//! only errors surfaced to callers.

use std::collections::HashMap;
use std::sync::Arc;

use analysis_core::{
    AnalysisError, AnalysisResult, CandidateScore, CrossoverEvent, Direction, MarketDataSource, PriceSmaPoint,
    RelativeStrengthPoint, SectorBreadthPoint,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::breadth::{compute_market_breadth, compute_sector_breadth};
use crate::crossover::{build_symbol_series, find_recent_crossovers};
use crate::ratings::{summarize_trend_ratings, TrendRatingSummary};
use crate::relative_strength::{
    compute_relative_strength, find_breadth_trough, relative_strength_window,
    sector_strength_at_trough,
};
use crate::rotation::{RotationDetector, RotationSummary};
use crate::scanner::{scan_long_candidates, scan_short_candidates, ScanInputs};

/// Universe and SMA a request runs against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthQuery {
    pub index_name: String,
    pub sma_period: u32,
    pub start_date: NaiveDate,
}

/// Sector and market breadth series for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthReport {
    pub sectors: Vec<SectorBreadthPoint>,
    pub market: Vec<SectorBreadthPoint>,
    pub relative_strength: Vec<RelativeStrengthPoint>,
}

/// Which sectors held up around a market breadth low
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TroughAnalysis {
    pub trough_date: NaiveDate,
    pub market_pct_above: Option<f64>,
    pub window_days: i64,
    /// One point per sector, strongest first
    pub sectors: Vec<RelativeStrengthPoint>,
    /// Every point inside the window, strongest first
    pub window: Vec<RelativeStrengthPoint>,
}

pub struct BreadthService {
    source: Arc<dyn MarketDataSource>,
    detector: RotationDetector,
}

impl BreadthService {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            detector: RotationDetector::default(),
        }
    }

    pub fn with_detector(mut self, detector: RotationDetector) -> Self {
        self.detector = detector;
        self
    }

    async fn load(
        &self,
        query: &BreadthQuery,
        sma_period: u32,
    ) -> AnalysisResult<(HashMap<String, String>, Vec<PriceSmaPoint>)> {
        ensure_period(sma_period)?;
        let membership = self.source.fetch_sector_membership(&query.index_name).await?;
        let symbols = self.source.fetch_sector_constituents(&query.index_name).await?;
        let points = self
            .source
            .fetch_price_sma(&symbols, sma_period, query.start_date)
            .await?;

        info!(
            "Loaded {} rows for {} symbols in {} (SMA {})",
            points.len(),
            symbols.len(),
            query.index_name,
            sma_period
        );
        Ok((membership, points))
    }

    /// Per-sector and market breadth plus relative strength.
    pub async fn sector_breadth(&self, query: &BreadthQuery) -> AnalysisResult<BreadthReport> {
        let (membership, points) = self.load(query, query.sma_period).await?;
        let sectors = compute_sector_breadth(&points, &membership);
        let market = compute_market_breadth(&points);
        let relative_strength = compute_relative_strength(&sectors, &market);

        Ok(BreadthReport {
            sectors,
            market,
            relative_strength,
        })
    }

    /// Ranked sector table with momentum over `lag_days` observations.
    pub async fn rotation_summary(
        &self,
        query: &BreadthQuery,
        lag_days: usize,
    ) -> AnalysisResult<Option<RotationSummary>> {
        let report = self.sector_breadth(query).await?;
        let summary = self
            .detector
            .summarize(&report.sectors, &report.market, lag_days);
        if let Some(summary) = &summary {
            info!(
                "Rotation as of {}: {} (spread {:.2})",
                summary.as_of, summary.signal.rotation_type, summary.signal.strength
            );
        }
        Ok(summary)
    }

    /// Sector relative strength around `trough_date`, or around the lowest
    /// market breadth reading when no date is given.
    pub async fn trough_analysis(
        &self,
        query: &BreadthQuery,
        trough_date: Option<NaiveDate>,
        window_days: i64,
    ) -> AnalysisResult<Option<TroughAnalysis>> {
        let report = self.sector_breadth(query).await?;
        let Some(trough_date) = trough_date.or_else(|| find_breadth_trough(&report.market)) else {
            return Ok(None);
        };

        let market_pct_above = report
            .market
            .iter()
            .find(|p| p.date == trough_date)
            .map(|p| p.pct_above);

        Ok(Some(TroughAnalysis {
            trough_date,
            market_pct_above,
            window_days,
            sectors: sector_strength_at_trough(&report.relative_strength, trough_date, window_days),
            window: relative_strength_window(&report.relative_strength, trough_date, window_days),
        }))
    }

    /// Symbols that recently crossed above their SMA and are still above it.
    pub async fn recovery_leaders(
        &self,
        query: &BreadthQuery,
        lookback_days: i64,
    ) -> AnalysisResult<Vec<CrossoverEvent>> {
        let (_, points) = self.load(query, query.sma_period).await?;
        let leaders = find_recent_crossovers(&build_symbol_series(&points), lookback_days);
        info!("{} recovery leaders in {}", leaders.len(), query.index_name);
        Ok(leaders)
    }

    /// Long or short swing scan. `query.sma_period` is the signal SMA;
    /// `confirmation_sma` is the longer trend filter.
    pub async fn scan(
        &self,
        query: &BreadthQuery,
        direction: Direction,
        confirmation_sma: u32,
        lookback_days: i64,
    ) -> AnalysisResult<Vec<CandidateScore>> {
        ensure_period(confirmation_sma)?;
        let (membership, primary) = self.load(query, query.sma_period).await?;
        let symbols: Vec<String> = {
            let mut symbols: Vec<String> = primary.iter().map(|p| p.symbol.clone()).collect();
            symbols.sort();
            symbols.dedup();
            symbols
        };
        let confirmation = self
            .source
            .fetch_price_sma(&symbols, confirmation_sma, query.start_date)
            .await?;
        let sector_breadth = compute_sector_breadth(&primary, &membership);

        let inputs = ScanInputs {
            primary: &primary,
            confirmation: &confirmation,
            membership: &membership,
            sector_breadth: &sector_breadth,
            scanned_at: Utc::now(),
        };
        let candidates = match direction {
            Direction::Long => scan_long_candidates(&inputs, lookback_days),
            Direction::Short => scan_short_candidates(&inputs, lookback_days),
        };

        info!(
            "{} scan of {}: {} candidates, {} rated 3+ stars",
            direction,
            query.index_name,
            candidates.len(),
            candidates.iter().filter(|c| c.stars >= 3).count()
        );
        Ok(candidates)
    }

    /// Distribution of trend ratings for the index on `date`.
    pub async fn trend_rating_summary(
        &self,
        date: NaiveDate,
        index_name: &str,
    ) -> AnalysisResult<Option<TrendRatingSummary>> {
        let rows = self.source.fetch_trend_ratings(date, index_name).await?;
        Ok(summarize_trend_ratings(date, &rows))
    }
}

fn ensure_period(sma_period: u32) -> AnalysisResult<()> {
    if sma_period == 0 {
        return Err(AnalysisError::InvalidData(
            "SMA period must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
