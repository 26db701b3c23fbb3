//! Risk pipeline error types.
//!
//! Structured error types for the risk stages using `thiserror` for
//! derivation. Adapter crates convert their own errors into [`RiskError`]
//! so that stage code can propagate with `?`.

use thiserror::Error;

/// Errors that can occur while computing portfolio risk metrics.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RiskError {
    /// A price sequence has fewer than two observations.
    #[error("Insufficient data for {asset}: got {got} price points, need at least 2")]
    InsufficientData {
        /// Asset identifier, or `"<unnamed>"` for a bare sequence
        asset: String,
        /// Number of observations supplied
        got: usize,
    },

    /// No asset is usable after filtering.
    #[error("No data: {0}")]
    NoData(String),

    /// An asset required for weighting has no returns.
    #[error("Data gap: asset {asset} carries a weight but has no returns")]
    DataGap {
        /// Asset identifier
        asset: String,
    },

    /// Invalid arithmetic input (non-positive or non-finite price).
    #[error("Numeric error: {0}")]
    Numeric(String),

    /// The text-generation call failed.
    #[error("Generation error: {0}")]
    Generation(String),

    /// The price source failed outright.
    #[error("Price source error: {0}")]
    Source(String),
}

impl RiskError {
    /// Create a no-data error
    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    /// Create a numeric error
    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::Numeric(msg.into())
    }

    /// Create a generation error
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Create a price source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Attach an asset identifier to an error raised on a bare sequence.
    pub(crate) fn for_asset(self, asset: &str) -> Self {
        match self {
            Self::InsufficientData { got, .. } => Self::InsufficientData {
                asset: asset.to_string(),
                got,
            },
            Self::Numeric(msg) => Self::Numeric(format!("{asset}: {msg}")),
            other => other,
        }
    }
}

/// Result alias for risk computations.
pub type RiskResult<T> = Result<T, RiskError>;
