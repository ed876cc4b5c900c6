//! Breadth by trend rating
//!
//! Summarises the precomputed trend ratings of an index on one date.

use analysis_core::math::{pct_of, round2};
use analysis_core::TrendRatingRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRatingSummary {
    pub date: NaiveDate,
    pub total: usize,
    /// rating > 0
    pub bullish: usize,
    /// rating < 0
    pub bearish: usize,
    pub neutral: usize,
    pub avg_rating: f64,
    pub pct_bullish: f64,
    pub pct_daily_up: f64,
    pub pct_weekly_up: f64,
    pub pct_monthly_up: f64,
}

fn is_up(trend: &Option<String>) -> bool {
    trend
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("up"))
}

/// Counts and percentages over `rows`; `None` when there are no usable rows.
/// Rows with a non-finite rating are ignored.
pub fn summarize_trend_ratings(date: NaiveDate, rows: &[TrendRatingRow]) -> Option<TrendRatingSummary> {
    let rows: Vec<&TrendRatingRow> = rows.iter().filter(|r| r.rating.is_finite()).collect();
    let total = rows.len();
    if total == 0 {
        return None;
    }

    let bullish = rows.iter().filter(|r| r.rating > 0.0).count();
    let bearish = rows.iter().filter(|r| r.rating < 0.0).count();
    let daily_up = rows.iter().filter(|r| is_up(&r.daily_trend)).count();
    let weekly_up = rows.iter().filter(|r| is_up(&r.weekly_trend)).count();
    let monthly_up = rows.iter().filter(|r| is_up(&r.monthly_trend)).count();
    let avg_rating = rows.iter().map(|r| r.rating).sum::<f64>() / total as f64;

    Some(TrendRatingSummary {
        date,
        total,
        bullish,
        bearish,
        neutral: total - bullish - bearish,
        avg_rating: round2(avg_rating),
        pct_bullish: pct_of(bullish, total)?,
        pct_daily_up: pct_of(daily_up, total)?,
        pct_weekly_up: pct_of(weekly_up, total)?,
        pct_monthly_up: pct_of(monthly_up, total)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(symbol: &str, rating: f64, daily: &str, weekly: &str, monthly: Option<&str>) -> TrendRatingRow {
        TrendRatingRow {
            symbol: symbol.to_string(),
            rating,
            daily_trend: Some(daily.to_string()),
            weekly_trend: Some(weekly.to_string()),
            monthly_trend: monthly.map(str::to_string),
        }
    }

    #[test]
    fn test_summary_counts() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let rows = vec![
            row("A", 7.5, "UP", "UP", Some("UP")),
            row("B", -3.0, "DOWN", "up", None),
            row("C", 0.0, "Up", "DOWN", Some("DOWN")),
            row("D", f64::NAN, "UP", "UP", Some("UP")),
        ];
        let summary = summarize_trend_ratings(date, &rows).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.bullish, 1);
        assert_eq!(summary.bearish, 1);
        assert_eq!(summary.neutral, 1);
        assert_relative_eq!(summary.avg_rating, 1.5);
        assert_relative_eq!(summary.pct_bullish, 33.33);
        assert_relative_eq!(summary.pct_daily_up, 66.67);
        assert_relative_eq!(summary.pct_weekly_up, 66.67);
        assert_relative_eq!(summary.pct_monthly_up, 33.33);
    }

    #[test]
    fn test_empty_ratings() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        assert!(summarize_trend_ratings(date, &[]).is_none());
    }
}
