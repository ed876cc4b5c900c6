use thiserror::Error;

/// Failures that cross the data-access boundary.
///
/// The breadth and scoring math never produces these: sparse or undefined
/// rows are omitted from results instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
