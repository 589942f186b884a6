//! Error type for the fallible edges of the crate (I/O, parsing, parameters,
//! point ids).
//!
//! Geometry and scoring never fail: degenerate segments simply score 0.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PtreesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record of the point table could not be used.
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Point ids index the input table and must stay below its row count.
    #[error("point id {id} out of range for {rows} points")]
    PointIdOutOfRange { id: usize, rows: usize },
}

impl PtreesError {
    pub fn record(line: u64, reason: impl Into<String>) -> Self {
        PtreesError::InvalidRecord {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PtreesError>;
