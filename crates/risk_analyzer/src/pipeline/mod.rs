//! Risk pipeline definitions.
//!
//! The pipeline is a fixed four-node graph:
//!
//! ```text
//!                  ┌──> market risk ──┐
//! price preparation                   ├──> report synthesis
//!                  └──> volatility  ──┘
//! ```

mod graph;
mod orchestrator;
mod state;

pub use graph::TaskGraph;
pub use orchestrator::{PipelineOutcome, PipelineSettings, RiskPipeline};
pub use state::PipelineState;

use std::fmt;
use std::sync::Arc;

/// Pipeline node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    /// Fetch short-horizon closes
    PricePreparation,
    /// VaR and stress test
    MarketRisk,
    /// Volatility, Sharpe ratio and correlation
    Volatility,
    /// Prompt, generation and rating
    ReportSynthesis,
}

impl NodeId {
    /// Every node in topological order
    pub const ALL: [NodeId; 4] = [
        Self::PricePreparation,
        Self::MarketRisk,
        Self::Volatility,
        Self::ReportSynthesis,
    ];

    /// Nodes that must complete before this one may start
    pub fn predecessors(&self) -> &'static [NodeId] {
        match self {
            Self::PricePreparation => &[],
            Self::MarketRisk | Self::Volatility => &[Self::PricePreparation],
            Self::ReportSynthesis => &[Self::MarketRisk, Self::Volatility],
        }
    }

    /// Get the node name for display
    pub fn name(&self) -> &'static str {
        match self {
            Self::PricePreparation => "price preparation",
            Self::MarketRisk => "market risk",
            Self::Volatility => "volatility",
            Self::ReportSynthesis => "report synthesis",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node lifecycle event reported to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Node started
    Started,
    /// Node finished and wrote its output
    Completed,
    /// Node failed; the pipeline aborts
    Failed,
}

/// Progress callback type for reporting node transitions
pub type ProgressCallback = Arc<dyn Fn(NodeId, NodeStatus) + Send + Sync>;
