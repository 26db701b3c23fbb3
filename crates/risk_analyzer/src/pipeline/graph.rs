//! Node scheduling bookkeeping.

use super::NodeId;
use crate::error::{AnalyzerError, Result};
use std::collections::BTreeSet;

/// Tracks which nodes have started and completed in one pipeline run.
///
/// A node may start once all its predecessors have completed, and at most
/// once per run.
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    started: BTreeSet<NodeId>,
    completed: BTreeSet<NodeId>,
}

impl TaskGraph {
    /// Fresh graph with nothing run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `node` could start now.
    pub fn is_ready(&self, node: NodeId) -> bool {
        !self.started.contains(&node)
            && node
                .predecessors()
                .iter()
                .all(|p| self.completed.contains(p))
    }

    /// Nodes that could start now, in topological order.
    pub fn ready(&self) -> Vec<NodeId> {
        NodeId::ALL
            .into_iter()
            .filter(|n| self.is_ready(*n))
            .collect()
    }

    /// Mark `node` as started.
    pub fn start(&mut self, node: NodeId) -> Result<()> {
        if self.started.contains(&node) {
            return Err(AnalyzerError::schedule(node, "already ran in this invocation"));
        }
        let pending: Vec<_> = node
            .predecessors()
            .iter()
            .filter(|p| !self.completed.contains(p))
            .map(|p| p.name())
            .collect();
        if !pending.is_empty() {
            return Err(AnalyzerError::schedule(
                node,
                format!("waiting on {}", pending.join(", ")),
            ));
        }
        self.started.insert(node);
        Ok(())
    }

    /// Mark a started `node` as completed.
    pub fn complete(&mut self, node: NodeId) -> Result<()> {
        if !self.started.contains(&node) {
            return Err(AnalyzerError::schedule(node, "completed without starting"));
        }
        self.completed.insert(node);
        Ok(())
    }

    /// Whether `node` has completed.
    pub fn is_complete(&self, node: NodeId) -> bool {
        self.completed.contains(&node)
    }

    /// Whether every node has completed.
    pub fn is_finished(&self) -> bool {
        NodeId::ALL.into_iter().all(|n| self.is_complete(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_preparation_is_ready_initially() {
        let graph = TaskGraph::new();
        assert_eq!(graph.ready(), vec![NodeId::PricePreparation]);
    }

    #[test]
    fn test_branches_ready_after_preparation() {
        let mut graph = TaskGraph::new();
        graph.start(NodeId::PricePreparation).unwrap();
        assert!(graph.ready().is_empty());
        graph.complete(NodeId::PricePreparation).unwrap();
        assert_eq!(graph.ready(), vec![NodeId::MarketRisk, NodeId::Volatility]);
    }

    #[test]
    fn test_report_waits_for_both_branches() {
        let mut graph = TaskGraph::new();
        graph.start(NodeId::PricePreparation).unwrap();
        graph.complete(NodeId::PricePreparation).unwrap();
        graph.start(NodeId::MarketRisk).unwrap();
        graph.start(NodeId::Volatility).unwrap();
        graph.complete(NodeId::Volatility).unwrap();

        let err = graph.start(NodeId::ReportSynthesis).unwrap_err();
        assert!(err.to_string().contains("market risk"));

        graph.complete(NodeId::MarketRisk).unwrap();
        graph.start(NodeId::ReportSynthesis).unwrap();
        graph.complete(NodeId::ReportSynthesis).unwrap();
        assert!(graph.is_finished());
    }

    #[test]
    fn test_node_runs_at_most_once() {
        let mut graph = TaskGraph::new();
        graph.start(NodeId::PricePreparation).unwrap();
        graph.complete(NodeId::PricePreparation).unwrap();
        assert!(graph.start(NodeId::PricePreparation).is_err());
        assert!(!graph.is_ready(NodeId::PricePreparation));
    }

    #[test]
    fn test_complete_requires_start() {
        let mut graph = TaskGraph::new();
        assert!(graph.complete(NodeId::Volatility).is_err());
        assert!(!graph.is_complete(NodeId::Volatility));
    }
}
