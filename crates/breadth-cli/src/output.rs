//! Rendering of command results as JSON documents or flat CSV tables.

use analysis_core::CandidateScore;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Pretty JSON for whole documents (summaries, nested reports).
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: W, value: &T) -> Result<()> {
    let mut out = out;
    serde_json::to_writer_pretty(&mut out, value).context("failed to serialize JSON output")?;
    writeln!(out)?;
    Ok(())
}

/// One CSV record per row, headers taken from the field names.
pub fn write_csv<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).context("failed to serialize CSV row")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `rows` in `format`. JSON renders the slice as an array.
pub fn write_rows<W: Write, T: Serialize>(out: W, format: OutputFormat, rows: &[T]) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, rows),
        OutputFormat::Csv => write_csv(out, rows),
    }
}

/// Flattened scan candidate; CSV cannot hold the nested score breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow {
    pub symbol: String,
    pub sector: String,
    pub direction: &'static str,
    pub score: f64,
    pub stars: u8,
    pub setup: String,
    pub sector_score: f64,
    pub timing_score: f64,
    pub entry_score: f64,
    pub confirmation_score: f64,
    pub days_since_cross: i64,
    pub pct_from_primary_sma: f64,
    pub pct_from_confirmation_sma: Option<f64>,
}

impl From<&CandidateScore> for CandidateRow {
    fn from(c: &CandidateScore) -> Self {
        Self {
            symbol: c.symbol.clone(),
            sector: c.sector.clone(),
            direction: c.direction.as_str(),
            score: c.score,
            stars: c.stars,
            setup: c.setup_label.clone(),
            sector_score: c.breakdown.sector,
            timing_score: c.breakdown.timing,
            entry_score: c.breakdown.entry,
            confirmation_score: c.breakdown.confirmation,
            days_since_cross: c.days_since_cross,
            pct_from_primary_sma: c.pct_from_primary_sma,
            pct_from_confirmation_sma: c.pct_from_confirmation_sma,
        }
    }
}
