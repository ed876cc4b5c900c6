use std::collections::HashMap;

use analysis_core::{AnalysisError, AnalysisResult, MarketDataSource, PriceSmaPoint, TrendRatingRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use crate::db::PriceDb;
use crate::models::{ConstituentRow, PriceSmaRow, TrendRatingRecord};

fn db_err(e: sqlx::Error) -> AnalysisError {
    AnalysisError::DatabaseError(e.to_string())
}

#[async_trait]
impl MarketDataSource for PriceDb {
    async fn fetch_price_sma(
        &self,
        symbols: &[String],
        sma_period: u32,
        start_date: NaiveDate,
    ) -> AnalysisResult<Vec<PriceSmaPoint>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT p.trade_date AS trade_date, p.symbol AS symbol, p.close AS close, s.value AS sma
            FROM daily_prices p
            LEFT JOIN sma_values s
                ON s.symbol = p.symbol AND s.trade_date = p.trade_date AND s.period = "#,
        );
        query.push_bind(sma_period as i64);
        query.push(" WHERE p.trade_date >= ");
        query.push_bind(start_date);
        query.push(" AND p.symbol IN (");
        let mut separated = query.separated(", ");
        for symbol in symbols {
            separated.push_bind(symbol.as_str());
        }
        separated.push_unseparated(") ORDER BY p.trade_date, p.symbol");

        let rows = query
            .build_query_as::<PriceSmaRow>()
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        debug!(
            "Fetched {} price/SMA{} rows for {} symbols since {}",
            rows.len(),
            sma_period,
            symbols.len(),
            start_date
        );
        Ok(rows.into_iter().map(PriceSmaPoint::from).collect())
    }

    async fn fetch_sector_membership(&self, index_name: &str) -> AnalysisResult<HashMap<String, String>> {
        let rows = sqlx::query_as::<_, ConstituentRow>(
            "SELECT index_name, symbol, sector FROM index_constituents WHERE index_name = ?",
        )
        .bind(index_name)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| Some((row.symbol, row.sector?)))
            .collect())
    }

    async fn fetch_sector_constituents(&self, index_name: &str) -> AnalysisResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT symbol FROM index_constituents WHERE index_name = ? ORDER BY symbol",
        )
        .bind(index_name)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(|(symbol,)| symbol).collect())
    }

    async fn fetch_trend_ratings(
        &self,
        date: NaiveDate,
        index_name: &str,
    ) -> AnalysisResult<Vec<TrendRatingRow>> {
        let records = sqlx::query_as::<_, TrendRatingRecord>(
            r#"
            SELECT t.symbol AS symbol, t.rating_date AS rating_date, t.rating AS rating,
                   t.daily_trend AS daily_trend, t.weekly_trend AS weekly_trend,
                   t.monthly_trend AS monthly_trend
            FROM trend_ratings t
            JOIN index_constituents c ON c.symbol = t.symbol AND c.index_name = ?
            WHERE t.rating_date = ?
            ORDER BY t.symbol
            "#,
        )
        .bind(index_name)
        .bind(date)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(records.into_iter().map(TrendRatingRow::from).collect())
    }
}
