//! SQLite-backed market data source.
//!
//! Reads prices, moving averages, index constituents and trend ratings
//! and serves them through [`analysis_core::MarketDataSource`].

pub mod db;
pub mod models;
pub mod source;

pub use db::PriceDb;
pub use models::{ConstituentRow, PriceSmaRow, TrendRatingRecord};
