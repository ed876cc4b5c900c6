//! Market Breadth Module
//!
//! Sector and market breadth, relative strength, SMA crossover detection and
//! the long/short composite scoring used by the swing scanners.
//!
//! Everything outside [`service`] is synchronous and pure: the functions take
//! already-fetched rows and return fresh values.

pub mod breadth;
pub mod buckets;
pub mod crossover;
pub mod ratings;
pub mod relative_strength;
pub mod rotation;
pub mod scanner;
pub mod scoring;
pub mod service;

pub use breadth::{breadth_at, compute_market_breadth, compute_sector_breadth, latest_breadth};
pub use buckets::{bucket_by_stars, StarBucket};
pub use crossover::{build_symbol_series, find_recent_breakdowns, find_recent_crossovers};
pub use ratings::{summarize_trend_ratings, TrendRatingSummary};
pub use relative_strength::{
    compute_relative_strength, find_breadth_trough, relative_strength_window,
    sector_strength_at_trough,
};
pub use rotation::{
    build_rotation_summary, compute_momentum, rank_sectors, RotationDetector, RotationSignal,
    RotationSummary, RotationType, SectorMomentum, SectorSummaryRow,
};
pub use scanner::{scan_long_candidates, scan_short_candidates, ScanInputs};
pub use scoring::{
    long_components, score_long_candidate, score_short_candidate, score_to_stars,
    short_components,
};
pub use service::{BreadthQuery, BreadthReport, BreadthService, TroughAnalysis};
