//! # risk_analyzer
//!
//! Portfolio risk analyzer service.
//!
//! ## Architecture Position
//!
//! **S**ervice layer of the A-I-P-S architecture. Wires the price feeds
//! (`adapter_feeds`) and the text generator (`adapter_llm`) into the
//! `risk_core` stages and runs them as a fixed task graph:
//!
//! price preparation → {market risk, volatility} → report synthesis
//!
//! ## Example
//!
//! ```rust,ignore
//! use risk_analyzer::prelude::*;
//!
//! let config = AnalyzerConfig::default();
//! let pipeline = RiskPipeline::new(
//!     price_source(&config),
//!     text_generator(&config)?,
//!     PipelineSettings::from(&config),
//! );
//! let outcome = pipeline.run(config.portfolio(), config.lookback_days).await?;
//! println!("{}", outcome.final_report.text);
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod setup;
pub mod summary;

pub use config::{build_config, AnalyzerConfig, CliOverrides, ConfigError, SourceKind};
pub use error::AnalyzerError;
pub use pipeline::{
    NodeId, NodeStatus, PipelineOutcome, PipelineSettings, PipelineState, ProgressCallback,
    RiskPipeline, TaskGraph,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{build_config, AnalyzerConfig, CliOverrides, SourceKind};
    pub use crate::error::AnalyzerError;
    pub use crate::pipeline::{
        NodeId, NodeStatus, PipelineSettings, ProgressCallback, RiskPipeline,
    };
    pub use crate::setup::{price_source, text_generator};
    pub use crate::summary::{banner, metrics_summary};
}
