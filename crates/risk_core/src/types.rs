//! Data model shared by the risk stages.
//!
//! All asset-keyed collections are ordered maps so that every iteration,
//! weighted sum and rendered prompt is deterministic regardless of the
//! order in which the caller supplied the assets.

use std::collections::BTreeMap;
use std::fmt;

/// Asset identifier (ticker symbol).
pub type AssetId = String;

/// Fixed-weight portfolio: asset identifier → allocation weight in `[0, 1]`.
///
/// Weights are expected to sum to 1.0; the core does not enforce this.
/// Immutable once constructed.
///
/// # Examples
///
/// ```
/// use risk_core::Portfolio;
///
/// let portfolio = Portfolio::new([("AAPL", 0.6), ("MSFT", 0.4)]);
/// assert_eq!(portfolio.weight("AAPL"), Some(0.6));
/// assert_eq!(portfolio.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    weights: BTreeMap<AssetId, f64>,
}

impl Portfolio {
    /// Build a portfolio from `(asset, weight)` pairs.
    pub fn new<I, K>(weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<AssetId>,
    {
        Self {
            weights: weights.into_iter().map(|(k, w)| (k.into(), w)).collect(),
        }
    }

    /// Allocation weight of an asset, if held.
    pub fn weight(&self, asset: &str) -> Option<f64> {
        self.weights.get(asset).copied()
    }

    /// Iterate `(asset, weight)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, w)| (k.as_str(), *w))
    }

    /// Held asset identifiers in identifier order.
    pub fn assets(&self) -> Vec<AssetId> {
        self.weights.keys().cloned().collect()
    }

    /// Number of holdings.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the portfolio holds nothing.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (asset, weight)) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{asset}: {weight}")?;
        }
        write!(f, "}}")
    }
}

/// Daily closing prices per asset, chronological.
///
/// Construction enforces the invariant that every series has at least two
/// observations: shorter series are dropped and logged. Both the short- and
/// long-horizon fetch paths build through [`PriceSeries::new`], so the drop
/// policy is applied uniformly.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceSeries {
    closes: BTreeMap<AssetId, Vec<f64>>,
}

impl PriceSeries {
    /// Build a price series, dropping assets with fewer than two prices.
    pub fn new<I, K>(closes: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<AssetId>,
    {
        let mut kept = BTreeMap::new();
        for (asset, prices) in closes {
            let asset = asset.into();
            if prices.len() < 2 {
                tracing::warn!(asset = %asset, observations = prices.len(), "Dropping asset with insufficient price data");
                continue;
            }
            kept.insert(asset, prices);
        }
        Self { closes: kept }
    }

    /// Closing prices for an asset.
    pub fn get(&self, asset: &str) -> Option<&[f64]> {
        self.closes.get(asset).map(Vec::as_slice)
    }

    /// Whether the asset has a series.
    pub fn contains(&self, asset: &str) -> bool {
        self.closes.contains_key(asset)
    }

    /// Iterate `(asset, prices)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.closes.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Asset identifiers present.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.closes.keys().map(String::as_str)
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Whether no asset survived.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Long-horizon prices with the calendar dates they were observed on.
///
/// `dates[i]` is the ISO date of `prices[asset][i]` for every asset.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatedPriceSeries {
    /// Closing prices
    pub prices: PriceSeries,
    /// ISO `YYYY-MM-DD` dates, index-aligned to the prices
    pub dates: Vec<String>,
}

impl DatedPriceSeries {
    /// Pair prices with their dates.
    pub fn new(prices: PriceSeries, dates: Vec<String>) -> Self {
        Self { prices, dates }
    }
}

/// Output of the market risk stage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketRiskMetrics {
    /// One-day historical VaR as a positive fraction, 4 decimals
    pub value_at_risk: f64,
    /// Human-readable stress test summary
    pub stress_test_summary: String,
}

/// Output of the volatility stage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolatilityMetrics {
    /// Annualised volatility per asset, 4 decimals
    pub volatility_scores: BTreeMap<AssetId, f64>,
    /// Annualised portfolio Sharpe ratio, 4 decimals
    pub sharpe_ratio: f64,
    /// Pairwise Pearson correlation, 4 decimals
    pub correlation_matrix: BTreeMap<AssetId, BTreeMap<AssetId, f64>>,
}

/// Quantitative risk record consumed by the report stage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskReport {
    /// One-day historical VaR (95%)
    pub value_at_risk: f64,
    /// Stress test summary text
    pub stress_test_summary: String,
    /// Annualised volatility per asset
    pub volatility_scores: BTreeMap<AssetId, f64>,
    /// Annualised Sharpe ratio
    pub sharpe_ratio: f64,
    /// Pairwise correlation matrix
    pub correlation_matrix: BTreeMap<AssetId, BTreeMap<AssetId, f64>>,
}

impl RiskReport {
    /// Merge the two independent stage outputs.
    pub fn from_parts(market: MarketRiskMetrics, volatility: VolatilityMetrics) -> Self {
        Self {
            value_at_risk: market.value_at_risk,
            stress_test_summary: market.stress_test_summary,
            volatility_scores: volatility.volatility_scores,
            sharpe_ratio: volatility.sharpe_ratio,
            correlation_matrix: volatility.correlation_matrix,
        }
    }
}

/// Categorical risk rating extracted from the generated report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskRating {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
    /// No parseable rating
    #[default]
    Unknown,
}

impl RiskRating {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Unknown => "Unknown",
        }
    }

    /// Interpret free text as a rating, case-insensitively.
    ///
    /// Surrounding whitespace, markdown emphasis and trailing punctuation
    /// are ignored; anything else is [`RiskRating::Unknown`].
    pub fn from_label(text: &str) -> Self {
        let cleaned = text
            .trim()
            .trim_matches(|c: char| c == '*' || c == '_' || c == '.' || c == '!')
            .trim();
        match cleaned.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for RiskRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Narrated report: terminal artifact of the pipeline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinalReport {
    /// Generated report text, verbatim
    pub text: String,
    /// Extracted rating
    pub rating: RiskRating,
}
