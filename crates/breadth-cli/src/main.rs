//! breadth: sector breadth, rotation and swing-scan reports over a local price database.
//!
//! Usage:
//!   cargo run -p breadth-cli -- breadth --latest
//!   cargo run -p breadth-cli -- rotation --lag 5
//!   cargo run -p breadth-cli -- trough --window 5
//!   cargo run -p breadth-cli -- leaders --lookback 20 --format csv
//!   cargo run -p breadth-cli -- scan --side short --buckets
//!   cargo run -p breadth-cli -- ratings --date 2024-09-02

mod config;
mod output;

use analysis_core::{CandidateScore, Direction, RelativeStrengthPoint};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use config::BreadthConfig;
use market_breadth::{bucket_by_stars, latest_breadth, BreadthQuery, BreadthService};
use output::{write_json, write_rows, CandidateRow, OutputFormat};
use price_store::PriceDb;
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sector breadth and swing scanner", long_about = None)]
struct Cli {
    /// SQLite URL, overrides DATABASE_URL
    #[arg(long)]
    db: Option<String>,

    /// Index whose constituents are analysed, overrides INDEX_NAME
    #[arg(long)]
    index: Option<String>,

    /// Signal SMA period, overrides SMA_PERIOD
    #[arg(long)]
    sma: Option<u32>,

    /// Calendar days of history to load, overrides HISTORY_DAYS
    #[arg(long)]
    history: Option<i64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-sector and market breadth with relative strength
    Breadth {
        /// Only the most recent date
        #[arg(long)]
        latest: bool,
    },
    /// Ranked sector table and cyclical/defensive rotation signal
    Rotation {
        #[arg(long)]
        lag: Option<usize>,
    },
    /// Sector relative strength around a market breadth trough
    Trough {
        /// Trough date; the lowest market reading is used when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        window: Option<i64>,
    },
    /// Recent crossovers above the SMA that are still holding
    Leaders {
        #[arg(long)]
        lookback: Option<i64>,
    },
    /// Scored long or short swing candidates
    Scan {
        #[arg(long, value_enum, default_value_t = Side::Long)]
        side: Side,
        #[arg(long)]
        confirmation_sma: Option<u32>,
        #[arg(long)]
        lookback: Option<i64>,
        /// Group candidates into star-rating watchlists
        #[arg(long)]
        buckets: bool,
    },
    /// Trend rating distribution for a date
    Ratings {
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    Long,
    Short,
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::Long => Direction::Long,
            Side::Short => Direction::Short,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "breadth=info,market_breadth=info,price_store=warn".into());
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // stdout carries the report; logs go to stderr
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = BreadthConfig::from_env().context("invalid configuration")?;
    if let Some(db) = cli.db.clone() {
        config.database_url = db;
    }
    if let Some(index) = cli.index.clone() {
        config.index_name = index;
    }
    if let Some(sma) = cli.sma {
        config.sma_period = sma;
    }
    if let Some(history) = cli.history {
        config.history_days = history;
    }
    config.validate()?;

    if !PriceDb::exists(&config.database_url) {
        warn!("{} does not exist, starting from an empty database", config.database_url);
    }
    let db = PriceDb::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    let service = BreadthService::new(Arc::new(db)).with_detector(config.rotation_detector());

    let query = BreadthQuery {
        index_name: config.index_name.clone(),
        sma_period: config.sma_period,
        start_date: (Utc::now() - Duration::days(config.history_days)).date_naive(),
    };
    info!(
        "{} | SMA {} | rows since {}",
        query.index_name, query.sma_period, query.start_date
    );

    let stdout = io::stdout().lock();
    match cli.command {
        Command::Breadth { latest } => {
            let mut report = service.sector_breadth(&query).await?;
            if latest {
                report.sectors = latest_breadth(&report.sectors);
                report.market = latest_breadth(&report.market);
                report.relative_strength = latest_relative_strength(&report.relative_strength);
            }
            match cli.format {
                OutputFormat::Json => write_json(stdout, &report)?,
                OutputFormat::Csv => {
                    let mut rows = report.sectors;
                    rows.extend(report.market);
                    write_rows(stdout, cli.format, &rows)?;
                }
            }
        }
        Command::Rotation { lag } => {
            let lag = lag.unwrap_or(config.momentum_lag);
            match service.rotation_summary(&query, lag).await? {
                Some(summary) => match cli.format {
                    OutputFormat::Json => write_json(stdout, &summary)?,
                    OutputFormat::Csv => write_rows(stdout, cli.format, &summary.rows)?,
                },
                None => warn!("no breadth data since {}", query.start_date),
            }
        }
        Command::Trough { date, window } => {
            let window = window.unwrap_or(config.trough_window_days);
            match service.trough_analysis(&query, date, window).await? {
                Some(analysis) => match cli.format {
                    OutputFormat::Json => write_json(stdout, &analysis)?,
                    OutputFormat::Csv => write_rows(stdout, cli.format, &analysis.sectors)?,
                },
                None => warn!("no market breadth to locate a trough"),
            }
        }
        Command::Leaders { lookback } => {
            let lookback = lookback.unwrap_or(config.lookback_days);
            let leaders = service.recovery_leaders(&query, lookback).await?;
            write_rows(stdout, cli.format, &leaders)?;
        }
        Command::Scan {
            side,
            confirmation_sma,
            lookback,
            buckets,
        } => {
            let candidates = service
                .scan(
                    &query,
                    side.into(),
                    confirmation_sma.unwrap_or(config.confirmation_sma_period),
                    lookback.unwrap_or(config.lookback_days),
                )
                .await?;
            write_candidates(stdout, cli.format, &candidates, buckets)?;
        }
        Command::Ratings { date } => {
            match service
                .trend_rating_summary(date, &query.index_name)
                .await?
            {
                Some(summary) => write_rows(stdout, cli.format, &[summary])?,
                None => warn!("no trend ratings for {} on {}", query.index_name, date),
            }
        }
    }

    Ok(())
}

fn latest_relative_strength(points: &[RelativeStrengthPoint]) -> Vec<RelativeStrengthPoint> {
    match points.iter().map(|p| p.date).max() {
        Some(latest) => points.iter().filter(|p| p.date == latest).cloned().collect(),
        None => Vec::new(),
    }
}

fn write_candidates<W: io::Write>(
    out: W,
    format: OutputFormat,
    candidates: &[CandidateScore],
    buckets: bool,
) -> Result<()> {
    match (format, buckets) {
        (OutputFormat::Json, true) => write_json(out, &bucket_by_stars(candidates)),
        (OutputFormat::Json, false) => write_json(out, candidates),
        (OutputFormat::Csv, _) => {
            let rows: Vec<CandidateRow> = candidates.iter().map(CandidateRow::from).collect();
            write_rows(out, format, &rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_cli_parses_scan_flags() {
        let cli = Cli::try_parse_from([
            "breadth", "--format", "csv", "scan", "--side", "short", "--lookback", "10", "--buckets",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Csv);
        match cli.command {
            Command::Scan {
                side,
                lookback,
                buckets,
                confirmation_sma,
            } => {
                assert_eq!(Direction::from(side), Direction::Short);
                assert_eq!(lookback, Some(10));
                assert!(buckets);
                assert_eq!(confirmation_sma, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_dates() {
        let cli = Cli::try_parse_from(["breadth", "trough", "--date", "2024-06-04"]).unwrap();
        match cli.command {
            Command::Trough { date, window } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 4));
                assert_eq!(window, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["breadth", "ratings", "--date", "june"]).is_err());
    }

    #[test]
    fn test_breadth_latest_flag() {
        let cli = Cli::try_parse_from(["breadth", "breadth", "--latest"]).unwrap();
        assert!(matches!(cli.command, Command::Breadth { latest: true }));
        let cli = Cli::try_parse_from(["breadth", "breadth"]).unwrap();
        assert!(matches!(cli.command, Command::Breadth { latest: false }));
    }

    #[test]
    fn test_latest_relative_strength_keeps_last_date() {
        let point = |day: u32, sector: &str| RelativeStrengthPoint {
            date: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
            sector: sector.to_string(),
            sector_pct_above: 50.0,
            market_pct_above: 40.0,
            relative_strength: 10.0,
        };
        let points = vec![point(2, "Realty"), point(3, "Realty"), point(3, "Power")];
        let latest = latest_relative_strength(&points);
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|p| p.date.day() == 3));
        assert!(latest_relative_strength(&[]).is_empty());
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
