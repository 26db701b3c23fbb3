//! # Risk Core (P: Risk Layer)
//!
//! Quantitative risk metrics for a fixed-weight asset portfolio computed from
//! historical closing prices, and the narration of those metrics into a rated
//! report.
//!
//! This crate provides:
//! - The returns engine (simple daily returns, weighted portfolio returns)
//! - Historical VaR and a rolling-window stress test ([`market_risk`])
//! - Annualised volatility, Sharpe ratio and correlation ([`volatility`])
//! - Prompt rendering and rating extraction ([`report`])
//! - Capability traits for the price feed and the text generator ([`traits`])
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             risk_analyzer (S)           │
//! │   task graph: P → {M, V} → R            │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │              risk_core (P)              │
//! ├─────────────────────────────────────────┤
//! │  returns/      - returns engine         │
//! │  market_risk/  - VaR, stress windows    │
//! │  volatility/   - vol, Sharpe, corr      │
//! │  report/       - prompt, rating         │
//! └─────────────────────────────────────────┘
//!          ↑
//! ┌─────────────────────────────────────────┐
//! │   adapter_feeds / adapter_llm (A)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use risk_core::{Portfolio, PriceSeries, VolatilityStage};
//!
//! let portfolio = Portfolio::new([("A", 0.5), ("B", 0.5)]);
//! let prices = PriceSeries::new([
//!     ("A", vec![100.0, 110.0, 99.0]),
//!     ("B", vec![50.0, 55.0, 49.5]),
//! ]);
//!
//! let metrics = VolatilityStage::new().run(&portfolio, &prices).unwrap();
//! assert_eq!(metrics.correlation_matrix["A"]["B"], 1.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod market_risk;
pub mod report;
pub mod returns;
pub mod stats;
pub mod traits;
pub mod types;
pub mod volatility;

pub use error::{RiskError, RiskResult};
pub use market_risk::{MarketRiskStage, StressPeriod, WorstWindow};
pub use report::{parse_rating, render_prompt, ReportStage};
pub use returns::{compute_returns, portfolio_returns, ReturnsSeries};
pub use traits::{PriceSeriesSource, TextGenerator};
pub use types::{
    AssetId, DatedPriceSeries, FinalReport, MarketRiskMetrics, Portfolio, PriceSeries,
    RiskRating, RiskReport, VolatilityMetrics,
};
pub use volatility::VolatilityStage;
