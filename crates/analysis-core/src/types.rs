use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sector label used for the market-wide breadth series.
pub const MARKET_SECTOR: &str = "ALL";

/// One symbol on one trading date, with its moving average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSmaPoint {
    pub date: NaiveDate,
    pub symbol: String,
    pub close: f64,
    /// `None` until enough history exists for the average
    #[serde(default)]
    pub sma: Option<f64>,
}

impl PriceSmaPoint {
    pub fn new(date: NaiveDate, symbol: impl Into<String>, close: f64, sma: Option<f64>) -> Self {
        Self {
            date,
            symbol: symbol.into(),
            close,
            sma,
        }
    }

    /// Strictly above the SMA. `None` when the SMA is missing.
    pub fn above_sma(&self) -> Option<bool> {
        self.sma.map(|sma| self.close > sma)
    }
}

/// Percentage of a sector's constituents trading above their SMA on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorBreadthPoint {
    pub date: NaiveDate,
    pub sector: String,
    pub stocks_above: usize,
    pub total_stocks: usize,
    /// 0-100, two decimal places
    pub pct_above: f64,
}

impl SectorBreadthPoint {
    pub fn is_market(&self) -> bool {
        self.sector == MARKET_SECTOR
    }
}

/// Sector breadth minus market breadth on the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeStrengthPoint {
    pub date: NaiveDate,
    pub sector: String,
    pub sector_pct_above: f64,
    pub market_pct_above: f64,
    /// Signed, unclamped
    pub relative_strength: f64,
}

/// One observation in a symbol's chronologically ordered series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeriesPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: f64,
    pub above_sma: bool,
}

impl SymbolSeriesPoint {
    pub fn new(date: NaiveDate, close: f64, sma: f64) -> Self {
        Self {
            date,
            close,
            sma,
            above_sma: close > sma,
        }
    }
}

/// The most recent SMA cross for a symbol.
///
/// For bullish crossovers `still_above` is true; the breakdown detector
/// reuses this type with `still_above == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub symbol: String,
    pub cross_date: NaiveDate,
    /// Calendar days between the cross and the latest observation
    pub days_since_cross: i64,
    pub current_price: f64,
    pub sma_value: f64,
    pub pct_from_sma: f64,
    pub still_above: bool,
}

/// Side of a swing setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four additive parts of a composite score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Sector strength (long) or weakness (short)
    pub sector: f64,
    /// Freshness (long) or persistence below the SMA (short)
    pub timing: f64,
    /// Entry proximity (long) or breakdown magnitude (short)
    pub entry: f64,
    /// Position relative to the confirmation SMA
    pub confirmation: f64,
}

impl ScoreBreakdown {
    /// Sum of the components, not clamped to 100.
    pub fn total(&self) -> f64 {
        self.sector + self.timing + self.entry + self.confirmation
    }
}

/// Ranked swing candidate produced by a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub symbol: String,
    pub sector: String,
    pub direction: Direction,
    pub score: f64,
    pub stars: u8,
    pub setup_label: String,
    pub breakdown: ScoreBreakdown,
    pub days_since_cross: i64,
    pub pct_from_primary_sma: f64,
    /// `None` when the confirmation SMA was unavailable
    pub pct_from_confirmation_sma: Option<f64>,
    pub scanned_at: DateTime<Utc>,
}

/// Precomputed trend rating row for a symbol on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRatingRow {
    pub symbol: String,
    pub rating: f64,
    #[serde(default)]
    pub daily_trend: Option<String>,
    #[serde(default)]
    pub weekly_trend: Option<String>,
    #[serde(default)]
    pub monthly_trend: Option<String>,
}
