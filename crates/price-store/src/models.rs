use analysis_core::{PriceSmaPoint, TrendRatingRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceSmaRow {
    pub trade_date: NaiveDate,
    pub symbol: String,
    pub close: f64,
    pub sma: Option<f64>,
}

impl From<PriceSmaRow> for PriceSmaPoint {
    fn from(row: PriceSmaRow) -> Self {
        PriceSmaPoint {
            date: row.trade_date,
            symbol: row.symbol,
            close: row.close,
            sma: row.sma,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConstituentRow {
    pub index_name: String,
    pub symbol: String,
    pub sector: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrendRatingRecord {
    pub symbol: String,
    pub rating_date: NaiveDate,
    pub rating: f64,
    pub daily_trend: Option<String>,
    pub weekly_trend: Option<String>,
    pub monthly_trend: Option<String>,
}

impl From<TrendRatingRecord> for TrendRatingRow {
    fn from(record: TrendRatingRecord) -> Self {
        TrendRatingRow {
            symbol: record.symbol,
            rating: record.rating,
            daily_trend: record.daily_trend,
            weekly_trend: record.weekly_trend,
            monthly_trend: record.monthly_trend,
        }
    }
}
