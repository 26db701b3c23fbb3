//! Error types for the risk analyzer service.

use crate::config::ConfigError;
use crate::pipeline::NodeId;
use risk_core::RiskError;
use thiserror::Error;

/// Analyzer error type
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A stage failed
    #[error("{0}")]
    Risk(#[from] RiskError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A field a downstream node needs was never written
    #[error("Pipeline state is missing the {0} output")]
    MissingStageOutput(&'static str),

    /// The task graph refused to run a node
    #[error("Cannot run node '{node}': {reason}")]
    Schedule {
        /// Node that was refused
        node: NodeId,
        /// Why it was refused
        reason: String,
    },

    /// A spawned stage task panicked or was cancelled
    #[error("Stage task for '{node}' did not finish: {message}")]
    Join {
        /// Node whose task failed
        node: NodeId,
        /// Join error message
        message: String,
    },

    /// A collaborator could not be constructed
    #[error("Setup error: {0}")]
    Setup(String),
}

impl AnalyzerError {
    /// Create a scheduling error
    pub fn schedule(node: NodeId, reason: impl Into<String>) -> Self {
        Self::Schedule {
            node,
            reason: reason.into(),
        }
    }

    /// Create a setup error
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }
}

/// Analyzer result alias
pub type Result<T> = std::result::Result<T, AnalyzerError>;
