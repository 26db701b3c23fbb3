//! Feed error types.

use risk_core::RiskError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading price data.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Price file could not be opened or read.
    #[error("Cannot read {path}: {message}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Malformed CSV content.
    #[error("Malformed CSV in {path}: {message}")]
    Csv {
        /// File path
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// No requested asset yielded data.
    #[error("No price data returned for any of: {0}")]
    NoData(String),
}

impl From<FeedError> for RiskError {
    fn from(err: FeedError) -> Self {
        RiskError::source(err.to_string())
    }
}
