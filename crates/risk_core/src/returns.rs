//! Returns engine.
//!
//! Converts closing prices into simple daily returns and combines per-asset
//! returns into weighted portfolio returns. Shared by the market risk and
//! volatility stages.

use crate::error::{RiskError, RiskResult};
use crate::types::{AssetId, Portfolio, PriceSeries};
use std::collections::BTreeMap;

/// Simple returns of a chronological price sequence.
///
/// `returns[i] = (prices[i + 1] - prices[i]) / prices[i]`, length `n - 1`.
///
/// # Errors
///
/// - [`RiskError::InsufficientData`] for fewer than two prices
/// - [`RiskError::Numeric`] if any price is non-positive or non-finite
///
/// # Examples
///
/// ```
/// use risk_core::compute_returns;
///
/// let r = compute_returns(&[100.0, 110.0, 99.0]).unwrap();
/// assert_eq!(r.len(), 2);
/// assert!((r[0] - 0.10).abs() < 1e-12);
/// assert!((r[1] + 0.10).abs() < 1e-12);
/// ```
pub fn compute_returns(prices: &[f64]) -> RiskResult<Vec<f64>> {
    if prices.len() < 2 {
        return Err(RiskError::InsufficientData {
            asset: "<unnamed>".to_string(),
            got: prices.len(),
        });
    }
    if let Some((idx, p)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
        return Err(RiskError::numeric(format!(
            "price {p} at index {idx} is not a positive finite number"
        )));
    }

    Ok(prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Simple daily returns per asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReturnsSeries {
    returns: BTreeMap<AssetId, Vec<f64>>,
}

impl ReturnsSeries {
    /// Wrap precomputed return sequences.
    pub fn new<I, K>(returns: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<AssetId>,
    {
        Self {
            returns: returns.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Compute returns for every asset in a price series.
    ///
    /// Errors are tagged with the offending asset.
    pub fn from_prices(prices: &PriceSeries) -> RiskResult<Self> {
        let mut returns = BTreeMap::new();
        for (asset, closes) in prices.iter() {
            let r = compute_returns(closes).map_err(|e| e.for_asset(asset))?;
            tracing::debug!(asset = %asset, days = r.len(), "Computed daily returns");
            returns.insert(asset.to_string(), r);
        }
        Ok(Self { returns })
    }

    /// Returns for an asset.
    pub fn get(&self, asset: &str) -> Option<&[f64]> {
        self.returns.get(asset).map(Vec::as_slice)
    }

    /// Iterate `(asset, returns)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.returns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Asset identifiers present.
    pub fn assets(&self) -> Vec<&str> {
        self.returns.keys().map(String::as_str).collect()
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Whether no asset has returns.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Portfolio weights restricted to assets present here.
    ///
    /// Holdings the source failed to deliver are silently left out.
    pub fn available_weights<'p>(&self, portfolio: &'p Portfolio) -> Vec<(&'p str, f64)> {
        portfolio
            .iter()
            .filter(|(asset, _)| self.returns.contains_key(*asset))
            .collect()
    }
}

/// Weighted portfolio returns over the days common to all available assets.
///
/// Each day's return is `Σ weight × return` over the portfolio assets that
/// have returns. Every series ends on the latest fetched day, so each is cut
/// to its trailing `n` returns, `n` being the shortest available length.
///
/// # Errors
///
/// - [`RiskError::NoData`] if no portfolio asset has returns
/// - [`RiskError::DataGap`] if a weighted asset has an empty return sequence
pub fn portfolio_returns(returns: &ReturnsSeries, portfolio: &Portfolio) -> RiskResult<Vec<f64>> {
    let available = returns.available_weights(portfolio);
    if available.is_empty() {
        return Err(RiskError::no_data(
            "no portfolio asset has return data after filtering",
        ));
    }

    let mut series = Vec::with_capacity(available.len());
    for (asset, weight) in &available {
        let r = returns.get(asset).unwrap_or_default();
        if r.is_empty() {
            return Err(RiskError::DataGap {
                asset: asset.to_string(),
            });
        }
        series.push((r, *weight));
    }

    let num_days = series.iter().map(|(r, _)| r.len()).min().unwrap_or(0);
    let aligned: Vec<_> = series
        .iter()
        .map(|(r, w)| (&r[r.len() - num_days..], *w))
        .collect();
    Ok((0..num_days)
        .map(|day| aligned.iter().map(|(r, w)| r[day] * w).sum())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_compute_returns_basic() {
        let r = compute_returns(&[50.0, 55.0, 49.5]).unwrap();
        assert_relative_eq!(r[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_returns_insufficient() {
        assert!(matches!(
            compute_returns(&[100.0]),
            Err(RiskError::InsufficientData { got: 1, .. })
        ));
        assert!(matches!(
            compute_returns(&[]),
            Err(RiskError::InsufficientData { got: 0, .. })
        ));
    }

    #[test]
    fn test_compute_returns_rejects_non_positive() {
        assert!(matches!(
            compute_returns(&[100.0, 0.0, 50.0]),
            Err(RiskError::Numeric(_))
        ));
        assert!(matches!(
            compute_returns(&[100.0, -5.0]),
            Err(RiskError::Numeric(_))
        ));
        assert!(matches!(
            compute_returns(&[100.0, f64::NAN]),
            Err(RiskError::Numeric(_))
        ));
    }

    #[test]
    fn test_from_prices_tags_asset() {
        let prices = PriceSeries::new([("BAD", vec![10.0, 0.0, 5.0])]);
        let err = ReturnsSeries::from_prices(&prices).unwrap_err();
        assert!(err.to_string().contains("BAD"));
    }

    #[test]
    fn test_portfolio_returns_weighted_sum() {
        let returns = ReturnsSeries::new([("A", vec![0.10, -0.10]), ("B", vec![0.02, 0.04])]);
        let portfolio = Portfolio::new([("A", 0.5), ("B", 0.5)]);
        let pr = portfolio_returns(&returns, &portfolio).unwrap();
        assert_relative_eq!(pr[0], 0.06, epsilon = 1e-12);
        assert_relative_eq!(pr[1], -0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_portfolio_returns_truncates_to_shortest() {
        let returns = ReturnsSeries::new([
            ("A", vec![0.01, 0.02, 0.03]),
            ("B", vec![0.01, 0.02]),
            // Not held: must not limit the length.
            ("Z", vec![0.5]),
        ]);
        let portfolio = Portfolio::new([("A", 0.5), ("B", 0.5)]);
        assert_eq!(portfolio_returns(&returns, &portfolio).unwrap().len(), 2);
    }

    #[test]
    fn test_portfolio_returns_align_on_latest_days() {
        let returns = ReturnsSeries::new([("A", vec![0.5, 0.01, 0.02]), ("B", vec![0.02])]);
        let portfolio = Portfolio::new([("A", 0.5), ("B", 0.5)]);
        let pr = portfolio_returns(&returns, &portfolio).unwrap();
        assert_eq!(pr.len(), 1);
        assert_relative_eq!(pr[0], 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_portfolio_returns_skips_missing_assets() {
        let returns = ReturnsSeries::new([("A", vec![0.01, 0.02])]);
        let portfolio = Portfolio::new([("A", 0.6), ("MISSING", 0.4)]);
        let pr = portfolio_returns(&returns, &portfolio).unwrap();
        assert_relative_eq!(pr[0], 0.006, epsilon = 1e-12);
    }

    #[test]
    fn test_portfolio_returns_errors() {
        let portfolio = Portfolio::new([("A", 1.0)]);
        assert!(matches!(
            portfolio_returns(&ReturnsSeries::default(), &portfolio),
            Err(RiskError::NoData(_))
        ));

        let gap = ReturnsSeries::new([("A", Vec::new())]);
        assert_eq!(
            portfolio_returns(&gap, &portfolio),
            Err(RiskError::DataGap {
                asset: "A".to_string()
            })
        );
    }

    proptest! {
        #[test]
        fn test_returns_reconstruct_price_ratios(
            prices in prop::collection::vec(0.01f64..10_000.0, 2..200)
        ) {
            let r = compute_returns(&prices).unwrap();
            prop_assert_eq!(r.len(), prices.len() - 1);
            for i in 0..r.len() {
                let ratio = prices[i + 1] / prices[i];
                prop_assert!(((1.0 + r[i]) - ratio).abs() <= 1e-9 * ratio.max(1.0));
            }
        }
    }
}
