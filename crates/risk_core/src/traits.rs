//! Capability traits for the pipeline's external collaborators.
//!
//! Stages receive these as injected trait objects, so tests can substitute
//! deterministic fakes for the market-data feed and the language model.

use crate::error::RiskResult;
use crate::types::{AssetId, DatedPriceSeries, PriceSeries};
use async_trait::async_trait;

/// Source of daily closing prices.
///
/// Implementations tolerate partial results: an identifier that yields no
/// usable data is dropped and logged rather than failing the fetch. A fetch
/// where nothing at all is usable fails with
/// [`RiskError::Source`](crate::RiskError::Source).
#[async_trait]
pub trait PriceSeriesSource: Send + Sync {
    /// Short-horizon closes covering the last `lookback_days` calendar days.
    async fn fetch_prices(&self, assets: &[AssetId], lookback_days: u32)
        -> RiskResult<PriceSeries>;

    /// Long-horizon closes covering the last `lookback_years` years, with
    /// index-aligned trading dates.
    async fn fetch_dated_prices(
        &self,
        assets: &[AssetId],
        lookback_years: u32,
    ) -> RiskResult<DatedPriceSeries>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Opaque text-generation capability (a language model).
///
/// No structured output is assumed; callers parse plain text. Retries, if
/// any, are the implementation's concern.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> RiskResult<String>;
}
