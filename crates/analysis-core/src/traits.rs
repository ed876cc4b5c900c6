use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{AnalysisResult, PriceSmaPoint, TrendRatingRow};

/// Read-only access to the prices / SMA / constituents / trend-rating store.
///
/// Implementations own their connection lifecycle; the analysis functions
/// only ever see the rows returned here.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily close with the `sma_period` SMA for each symbol from `start_date`.
    /// `sma` is `None` where the average is not yet available.
    async fn fetch_price_sma(
        &self,
        symbols: &[String],
        sma_period: u32,
        start_date: NaiveDate,
    ) -> AnalysisResult<Vec<PriceSmaPoint>>;

    /// Symbol -> sector mapping for the constituents of `index_name`.
    async fn fetch_sector_membership(&self, index_name: &str) -> AnalysisResult<HashMap<String, String>>;

    /// Constituent symbols of `index_name`, sorted.
    async fn fetch_sector_constituents(&self, index_name: &str) -> AnalysisResult<Vec<String>>;

    /// Trend ratings for the constituents of `index_name` on `date`.
    async fn fetch_trend_ratings(
        &self,
        date: NaiveDate,
        index_name: &str,
    ) -> AnalysisResult<Vec<TrendRatingRow>>;
}
