//! Typed intermediate pipeline state.

use crate::error::{AnalyzerError, Result};
use risk_core::{
    FinalReport, MarketRiskMetrics, Portfolio, PriceSeries, RiskReport, VolatilityMetrics,
};
use std::sync::Arc;

/// Shared state of one pipeline run.
///
/// Inputs are set at construction; each node writes only its own field.
/// The price series and portfolio are behind `Arc` so both branches read
/// the same preparation output.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Portfolio under analysis
    pub portfolio: Arc<Portfolio>,
    /// Short-horizon lookback in calendar days
    pub lookback_days: u32,
    /// Written by price preparation
    pub prices: Option<Arc<PriceSeries>>,
    /// Written by market risk
    pub market: Option<MarketRiskMetrics>,
    /// Written by volatility
    pub volatility: Option<VolatilityMetrics>,
    /// Written by report synthesis
    pub final_report: Option<FinalReport>,
}

impl PipelineState {
    /// Initial state holding only the inputs.
    pub fn new(portfolio: Portfolio, lookback_days: u32) -> Self {
        Self {
            portfolio: Arc::new(portfolio),
            lookback_days,
            prices: None,
            market: None,
            volatility: None,
            final_report: None,
        }
    }

    /// Preparation output.
    pub fn prices(&self) -> Result<Arc<PriceSeries>> {
        self.prices
            .clone()
            .ok_or(AnalyzerError::MissingStageOutput("price preparation"))
    }

    /// Assemble the report record from both branch outputs.
    pub fn risk_report(&self) -> Result<RiskReport> {
        let market = self
            .market
            .clone()
            .ok_or(AnalyzerError::MissingStageOutput("market risk"))?;
        let volatility = self
            .volatility
            .clone()
            .ok_or(AnalyzerError::MissingStageOutput("volatility"))?;
        Ok(RiskReport::from_parts(market, volatility))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn market() -> MarketRiskMetrics {
        MarketRiskMetrics {
            value_at_risk: 0.021,
            stress_test_summary: "summary".to_string(),
        }
    }

    fn volatility() -> VolatilityMetrics {
        VolatilityMetrics {
            volatility_scores: BTreeMap::from([("AAPL".to_string(), 0.25)]),
            sharpe_ratio: 1.1,
            correlation_matrix: BTreeMap::new(),
        }
    }

    #[test]
    fn test_missing_prices() {
        let state = PipelineState::new(Portfolio::new([("AAPL", 1.0)]), 90);
        assert!(matches!(
            state.prices(),
            Err(AnalyzerError::MissingStageOutput("price preparation"))
        ));
    }

    #[test]
    fn test_risk_report_requires_both_branches() {
        let mut state = PipelineState::new(Portfolio::new([("AAPL", 1.0)]), 90);
        state.market = Some(market());
        assert!(matches!(
            state.risk_report(),
            Err(AnalyzerError::MissingStageOutput("volatility"))
        ));

        state.volatility = Some(volatility());
        let report = state.risk_report().unwrap();
        assert_eq!(report.value_at_risk, 0.021);
        assert_eq!(report.sharpe_ratio, 1.1);
        assert_eq!(report.volatility_scores["AAPL"], 0.25);
    }
}
