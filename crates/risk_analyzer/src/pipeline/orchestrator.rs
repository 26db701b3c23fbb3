//! Pipeline orchestrator.

use super::{NodeId, NodeStatus, PipelineState, ProgressCallback, TaskGraph};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use risk_core::market_risk::{
    DEFAULT_STRESS_LOOKBACK_YEARS, DEFAULT_STRESS_WINDOWS, DEFAULT_VAR_CONFIDENCE,
};
use risk_core::volatility::DEFAULT_RISK_FREE_RATE;
use risk_core::{
    FinalReport, MarketRiskStage, Portfolio, PriceSeries, PriceSeriesSource, ReportStage,
    RiskError, RiskReport, RiskResult, TextGenerator, VolatilityStage,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;

/// Numeric settings of the risk stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// VaR confidence level
    pub var_confidence: f64,
    /// Stress-test lookback in years
    pub stress_lookback_years: u32,
    /// Stress-test window lengths
    pub stress_windows: Vec<usize>,
    /// Annual risk-free rate
    pub risk_free_rate: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            var_confidence: DEFAULT_VAR_CONFIDENCE,
            stress_lookback_years: DEFAULT_STRESS_LOOKBACK_YEARS,
            stress_windows: DEFAULT_STRESS_WINDOWS.to_vec(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl From<&AnalyzerConfig> for PipelineSettings {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            var_confidence: config.var_confidence,
            stress_lookback_years: config.stress_lookback_years,
            stress_windows: config.stress_windows.clone(),
            risk_free_rate: config.risk_free_rate,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Narrated report
    pub final_report: FinalReport,
    /// Metrics the report was built from
    pub risk_report: RiskReport,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

/// Runs price preparation, then market risk and volatility concurrently,
/// then report synthesis.
pub struct RiskPipeline {
    source: Arc<dyn PriceSeriesSource>,
    market: Arc<MarketRiskStage>,
    volatility: Arc<VolatilityStage>,
    report: ReportStage,
    progress: Option<ProgressCallback>,
}

impl RiskPipeline {
    /// Wire the stages around a price source and a text generator.
    pub fn new(
        source: Arc<dyn PriceSeriesSource>,
        generator: Arc<dyn TextGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        let market = MarketRiskStage::new(Arc::clone(&source))
            .with_confidence(settings.var_confidence)
            .with_stress_lookback_years(settings.stress_lookback_years)
            .with_windows(settings.stress_windows);
        let volatility = VolatilityStage::new().with_risk_free_rate(settings.risk_free_rate);

        Self {
            source,
            market: Arc::new(market),
            volatility: Arc::new(volatility),
            report: ReportStage::new(generator),
            progress: None,
        }
    }

    /// Report node transitions to `callback`.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Run the whole graph once.
    ///
    /// Any node failure aborts the run; no partial report is produced.
    pub async fn run(&self, portfolio: Portfolio, lookback_days: u32) -> Result<PipelineOutcome> {
        let started = Instant::now();
        let mut graph = TaskGraph::new();
        let mut state = PipelineState::new(portfolio, lookback_days);
        tracing::info!(
            portfolio = %state.portfolio,
            lookback_days,
            source = self.source.name(),
            "Starting risk pipeline"
        );

        // Price preparation
        self.enter(&mut graph, NodeId::PricePreparation)?;
        let prices = self.prepare_prices(&state).await;
        state.prices = Some(Arc::new(self.settle(&mut graph, NodeId::PricePreparation, prices)?));

        // Market risk and volatility branches
        let prices = state.prices()?;
        self.enter(&mut graph, NodeId::MarketRisk)?;
        self.enter(&mut graph, NodeId::Volatility)?;

        let market_task = {
            let stage = Arc::clone(&self.market);
            let portfolio = Arc::clone(&state.portfolio);
            let prices = Arc::clone(&prices);
            tokio::spawn(async move { stage.run(&portfolio, &prices).await })
        };
        let volatility_task = {
            let stage = Arc::clone(&self.volatility);
            let portfolio = Arc::clone(&state.portfolio);
            let prices = Arc::clone(&prices);
            tokio::task::spawn_blocking(move || stage.run(&portfolio, &prices))
        };
        let (market, volatility) = tokio::join!(market_task, volatility_task);

        let market = self.settle(&mut graph, NodeId::MarketRisk, joined(NodeId::MarketRisk, market))?;
        state.market = Some(market);
        let volatility =
            self.settle(&mut graph, NodeId::Volatility, joined(NodeId::Volatility, volatility))?;
        state.volatility = Some(volatility);

        // Report synthesis
        let risk_report = state.risk_report()?;
        self.enter(&mut graph, NodeId::ReportSynthesis)?;
        let final_report = self.report.run(&state.portfolio, &risk_report).await;
        let final_report = self.settle(&mut graph, NodeId::ReportSynthesis, final_report)?;
        state.final_report = Some(final_report.clone());
        debug_assert!(graph.is_finished());

        let elapsed = started.elapsed();
        tracing::info!(
            rating = %final_report.rating,
            elapsed_ms = elapsed.as_millis() as u64,
            "Risk pipeline complete"
        );

        Ok(PipelineOutcome {
            final_report,
            risk_report,
            elapsed,
        })
    }

    /// Fetch short-horizon closes for every held asset.
    async fn prepare_prices(&self, state: &PipelineState) -> Result<PriceSeries> {
        let assets = state.portfolio.assets();
        tracing::info!(assets = ?assets, "Fetching historical prices");

        let prices = self
            .source
            .fetch_prices(&assets, state.lookback_days)
            .await?;
        for asset in assets.iter().filter(|a| !prices.contains(a)) {
            tracing::warn!(asset = %asset, "No usable price data, continuing without it");
        }
        if prices.is_empty() {
            return Err(RiskError::no_data("no asset in the portfolio has usable price data").into());
        }
        tracing::info!(
            days = state.lookback_days,
            assets = prices.len(),
            "Fetched historical prices"
        );
        Ok(prices)
    }

    fn enter(&self, graph: &mut TaskGraph, node: NodeId) -> Result<()> {
        graph.start(node)?;
        tracing::debug!(node = %node, "Node started");
        self.notify(node, NodeStatus::Started);
        Ok(())
    }

    fn settle<T, E>(&self, graph: &mut TaskGraph, node: NodeId, outcome: std::result::Result<T, E>) -> Result<T>
    where
        E: Into<AnalyzerError>,
    {
        match outcome {
            Ok(value) => {
                graph.complete(node)?;
                tracing::debug!(node = %node, ready = ?graph.ready(), "Node completed");
                self.notify(node, NodeStatus::Completed);
                Ok(value)
            }
            Err(err) => {
                let err = err.into();
                tracing::error!(node = %node, error = %err, "Node failed");
                self.notify(node, NodeStatus::Failed);
                Err(err)
            }
        }
    }

    fn notify(&self, node: NodeId, status: NodeStatus) {
        if let Some(callback) = &self.progress {
            callback(node, status);
        }
    }
}

/// Flatten a joined stage task into one result.
fn joined<T>(node: NodeId, outcome: std::result::Result<RiskResult<T>, JoinError>) -> Result<T> {
    match outcome {
        Ok(result) => Ok(result?),
        Err(err) => Err(AnalyzerError::Join {
            node,
            message: err.to_string(),
        }),
    }
}
