//! Volatility stage: annualised volatility, Sharpe ratio and correlation.

use crate::error::{RiskError, RiskResult};
use crate::returns::{portfolio_returns, ReturnsSeries};
use crate::stats::{mean, pearson_correlation, population_std_dev, round_to, TRADING_DAYS_PER_YEAR};
use crate::types::{AssetId, Portfolio, PriceSeries, VolatilityMetrics};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04;

/// Standard deviations at or below this are treated as zero variance.
///
/// Absorbs rounding noise on constant returns, whose computed deviation can
/// land a few ulps above zero.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Annualised volatility: population standard deviation × √252, 4 decimals.
pub fn annualized_volatility(returns: &[f64]) -> RiskResult<f64> {
    let daily = population_std_dev(returns)?;
    Ok(round_to(daily * TRADING_DAYS_PER_YEAR.sqrt(), 4))
}

/// Annualised Sharpe ratio of daily portfolio returns, 4 decimals.
///
/// `(mean - rf / 252) / std × √252`, defined as exactly 0.0 when the
/// returns have zero variance.
///
/// # Examples
///
/// ```
/// use risk_core::volatility::sharpe_ratio;
///
/// assert_eq!(sharpe_ratio(&[0.0, 0.0, 0.0], 0.04).unwrap(), 0.0);
/// ```
pub fn sharpe_ratio(portfolio_returns: &[f64], annual_risk_free_rate: f64) -> RiskResult<f64> {
    let daily_rf = annual_risk_free_rate / TRADING_DAYS_PER_YEAR;
    let mu = mean(portfolio_returns)?;
    let sigma = population_std_dev(portfolio_returns)?;

    if sigma <= ZERO_VARIANCE_TOLERANCE {
        return Ok(0.0);
    }
    Ok(round_to(
        (mu - daily_rf) / sigma * TRADING_DAYS_PER_YEAR.sqrt(),
        4,
    ))
}

/// Pearson correlation for every ordered pair of assets, 4 decimals.
///
/// The diagonal is 1.0. Pairs whose coefficient is undefined (zero
/// variance on either side) are reported as 0.0. Return sequences of
/// different lengths are compared on their overlapping trailing window.
pub fn correlation_matrix(returns: &ReturnsSeries) -> BTreeMap<AssetId, BTreeMap<AssetId, f64>> {
    let assets: Vec<(&str, &[f64])> = returns.iter().collect();

    assets
        .par_iter()
        .map(|(a, ra)| {
            let row = assets
                .iter()
                .map(|(b, rb)| {
                    let value = if a == b {
                        1.0
                    } else {
                        pearson_correlation(ra, rb).map_or(0.0, |r| round_to(r, 4))
                    };
                    (b.to_string(), value)
                })
                .collect::<BTreeMap<_, _>>();
            (a.to_string(), row)
        })
        .collect()
}

/// Volatility stage.
#[derive(Clone, Debug)]
pub struct VolatilityStage {
    risk_free_rate: f64,
}

impl Default for VolatilityStage {
    fn default() -> Self {
        Self::new()
    }
}

impl VolatilityStage {
    /// Create a stage with the default risk-free rate.
    pub fn new() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    /// Set the annual risk-free rate.
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Compute volatility scores, Sharpe ratio and correlation matrix.
    ///
    /// # Errors
    ///
    /// [`RiskError::NoData`] if no asset has returns; nothing partial is
    /// returned.
    pub fn run(&self, portfolio: &Portfolio, prices: &PriceSeries) -> RiskResult<VolatilityMetrics> {
        tracing::info!(assets = prices.len(), "Starting volatility and correlation calculations");

        let returns = ReturnsSeries::from_prices(prices)?;
        if returns.is_empty() {
            return Err(RiskError::no_data(
                "no valid assets with sufficient price data",
            ));
        }

        let mut volatility_scores = BTreeMap::new();
        for (asset, r) in returns.iter() {
            let vol = annualized_volatility(r)?;
            if vol.is_nan() {
                tracing::warn!(asset = %asset, "Dropping asset with undefined volatility");
                continue;
            }
            volatility_scores.insert(asset.to_string(), vol);
        }
        tracing::info!(scores = ?volatility_scores, "Volatility scores");

        let daily = portfolio_returns(&returns, portfolio)?;
        let sharpe = sharpe_ratio(&daily, self.risk_free_rate)?;
        tracing::info!(sharpe_ratio = sharpe, "Sharpe ratio");

        let correlation = correlation_matrix(&returns);
        tracing::info!(assets = correlation.len(), "Correlation matrix calculated");

        Ok(VolatilityMetrics {
            volatility_scores,
            sharpe_ratio: sharpe,
            correlation_matrix: correlation,
        })
    }
}
