use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::TrendRatingRecord;

const SCHEMA: &str = include_str!("../../../schema.sql");

/// Price / SMA / constituent store backed by one SQLite file.
#[derive(Clone)]
pub struct PriceDb {
    pool: SqlitePool,
}

impl PriceDb {
    /// Connect to `database_url`, creating the file and tables when missing.
    ///
    /// File databases run in WAL mode so a loader can write while reports read.
    pub async fn new(database_url: &str) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid SQLite URL {}", database_url))?
            .create_if_missing(true);

        // each in-memory connection is its own database, so keep exactly one
        let on_disk = Self::database_path(database_url).is_some();
        if on_disk {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if on_disk { 5 } else { 1 })
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.apply_schema().await?;
        Ok(db)
    }

    async fn apply_schema(&self) -> Result<()> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|stmt| !stmt.is_empty());

        let mut tx = self.pool.begin().await?;
        for stmt in statements {
            sqlx::query(stmt)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("schema statement failed: {}", stmt))?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// File backing `database_url`; `None` for in-memory databases.
    pub fn database_path(database_url: &str) -> Option<PathBuf> {
        let rest = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" || database_url.contains("mode=memory") {
            return None;
        }
        Some(PathBuf::from(path))
    }

    /// Whether the database already holds data on disk. In-memory URLs never do.
    pub fn exists(database_url: &str) -> bool {
        Self::database_path(database_url)
            .as_deref()
            .is_some_and(Path::exists)
    }

    /// Insert or replace a daily close
    pub async fn upsert_close(&self, symbol: &str, trade_date: NaiveDate, close: f64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_prices (symbol, trade_date, close)
            VALUES (?, ?, ?)
            ON CONFLICT(symbol, trade_date) DO UPDATE SET close = excluded.close
            "#,
        )
        .bind(symbol)
        .bind(trade_date)
        .bind(close)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace one SMA value
    pub async fn upsert_sma(
        &self,
        symbol: &str,
        trade_date: NaiveDate,
        period: u32,
        value: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sma_values (symbol, trade_date, period, value)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(symbol, trade_date, period) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(symbol)
        .bind(trade_date)
        .bind(period as i64)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add a symbol to an index, updating its sector if already present
    pub async fn upsert_constituent(
        &self,
        index_name: &str,
        symbol: &str,
        sector: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO index_constituents (index_name, symbol, sector)
            VALUES (?, ?, ?)
            ON CONFLICT(index_name, symbol) DO UPDATE SET sector = excluded.sector
            "#,
        )
        .bind(index_name)
        .bind(symbol)
        .bind(sector)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace a trend rating
    pub async fn upsert_trend_rating(&self, record: &TrendRatingRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trend_ratings
            (symbol, rating_date, rating, daily_trend, weekly_trend, monthly_trend)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(symbol, rating_date) DO UPDATE SET
                rating = excluded.rating,
                daily_trend = excluded.daily_trend,
                weekly_trend = excluded.weekly_trend,
                monthly_trend = excluded.monthly_trend
            "#,
        )
        .bind(&record.symbol)
        .bind(record.rating_date)
        .bind(record.rating)
        .bind(&record.daily_trend)
        .bind(&record.weekly_trend)
        .bind(&record.monthly_trend)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
