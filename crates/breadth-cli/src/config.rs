use analysis_core::{AnalysisError, AnalysisResult};
use anyhow::{Context, Result};
use market_breadth::RotationDetector;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthConfig {
    // Data source
    pub database_url: String,             // sqlite:market.db
    pub index_name: String,               // "NIFTY 500"

    // Moving averages
    pub sma_period: u32,                  // 50, signal / breadth SMA
    pub confirmation_sma_period: u32,     // 200, trend filter for scoring

    // Windows
    pub history_days: i64,                // calendar days of rows to load
    pub lookback_days: i64,               // max age of a crossover
    pub momentum_lag: usize,              // observed dates between momentum readings
    pub trough_window_days: i64,          // ± days around a breadth trough

    // Rotation
    pub rotation_threshold: f64,          // 5.0 breadth points between groups
    pub cyclical_sectors: Option<Vec<String>>,  // comma separated, NSE industry names by default
    pub defensive_sectors: Option<Vec<String>>,
}

impl Default for BreadthConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:market.db".to_string(),
            index_name: "NIFTY 500".to_string(),
            sma_period: 50,
            confirmation_sma_period: 200,
            history_days: 120,
            lookback_days: 30,
            momentum_lag: 5,
            trough_window_days: 5,
            rotation_threshold: 5.0,
            cyclical_sectors: None,
            defensive_sectors: None,
        }
    }
}

impl BreadthConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            index_name: lookup("INDEX_NAME").unwrap_or(defaults.index_name),
            sma_period: parse_or(&lookup, "SMA_PERIOD", defaults.sma_period)?,
            confirmation_sma_period: parse_or(
                &lookup,
                "CONFIRMATION_SMA_PERIOD",
                defaults.confirmation_sma_period,
            )?,
            history_days: parse_or(&lookup, "HISTORY_DAYS", defaults.history_days)?,
            lookback_days: parse_or(&lookup, "LOOKBACK_DAYS", defaults.lookback_days)?,
            momentum_lag: parse_or(&lookup, "MOMENTUM_LAG", defaults.momentum_lag)?,
            trough_window_days: parse_or(
                &lookup,
                "TROUGH_WINDOW_DAYS",
                defaults.trough_window_days,
            )?,
            rotation_threshold: parse_or(&lookup, "ROTATION_THRESHOLD", defaults.rotation_threshold)?,
            cyclical_sectors: lookup("CYCLICAL_SECTORS").map(|raw| parse_list(&raw)),
            defensive_sectors: lookup("DEFENSIVE_SECTORS").map(|raw| parse_list(&raw)),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        let invalid = |msg: &str| -> AnalysisResult<()> { Err(AnalysisError::Config(msg.to_string())) };

        if self.sma_period == 0 || self.confirmation_sma_period == 0 {
            return invalid("SMA periods must be greater than zero");
        }
        if self.history_days <= 0 {
            return invalid("HISTORY_DAYS must be positive");
        }
        if self.lookback_days < 0 || self.trough_window_days < 0 {
            return invalid("LOOKBACK_DAYS and TROUGH_WINDOW_DAYS must not be negative");
        }
        if self.index_name.trim().is_empty() {
            return invalid("INDEX_NAME must not be empty");
        }
        if !self.rotation_threshold.is_finite() || self.rotation_threshold < 0.0 {
            return invalid("ROTATION_THRESHOLD must be a non-negative number");
        }
        if self.cyclical_sectors.is_some() != self.defensive_sectors.is_some() {
            return invalid("CYCLICAL_SECTORS and DEFENSIVE_SECTORS must be set together");
        }
        if [&self.cyclical_sectors, &self.defensive_sectors]
            .iter()
            .any(|group| group.as_ref().is_some_and(Vec::is_empty))
        {
            return invalid("sector groups must name at least one sector");
        }
        Ok(())
    }

    /// Rotation detector from the configured groups and threshold.
    pub fn rotation_detector(&self) -> RotationDetector {
        match (&self.cyclical_sectors, &self.defensive_sectors) {
            (Some(cyclical), Some(defensive)) => RotationDetector::with_groups(
                cyclical.clone(),
                defensive.clone(),
                self.rotation_threshold,
            ),
            _ => RotationDetector::new().with_threshold(self.rotation_threshold),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
