//! Synthetic price feed.
//!
//! Generates reproducible daily closes with a geometric Brownian motion per
//! asset:
//!
//! S(t+dt) = S(t) · exp((μ - σ²/2)·dt + σ·√dt·Z)
//!
//! Paths are anchored at the end date and walked backwards, so a shorter
//! lookback is always the tail of a longer one: the VaR window and the
//! stress-test history see the same recent prices.

use crate::calendar::{to_iso, trading_days, DAYS_PER_YEAR};
use crate::error::FeedError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use risk_core::{AssetId, DatedPriceSeries, PriceSeries, PriceSeriesSource, RiskResult};
use std::collections::HashSet;

/// Time step of one trading day in years.
const DT: f64 = 1.0 / 252.0;

/// GBM parameters for one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmParams {
    /// Annual drift (μ)
    pub drift: f64,
    /// Annual volatility (σ)
    pub volatility: f64,
    /// Close on the end date
    pub end_price: f64,
}

impl GbmParams {
    /// Log-increment for one step given a standard normal draw.
    fn log_step(&self, z: f64) -> f64 {
        (self.drift - 0.5 * self.volatility * self.volatility) * DT + self.volatility * DT.sqrt() * z
    }
}

/// Seeded synthetic feed.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    seed: u64,
    end_date: NaiveDate,
    drift_range: (f64, f64),
    vol_range: (f64, f64),
    price_range: (f64, f64),
    unavailable: HashSet<AssetId>,
}

impl SyntheticFeed {
    /// Create a feed ending on `end_date`.
    pub fn new(seed: u64, end_date: NaiveDate) -> Self {
        Self {
            seed,
            end_date,
            drift_range: (-0.05, 0.15),
            vol_range: (0.15, 0.45),
            price_range: (20.0, 500.0),
            unavailable: HashSet::new(),
        }
    }

    /// Treat these identifiers as unknown to the feed.
    pub fn with_unavailable<I, K>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<AssetId>,
    {
        self.unavailable.extend(assets.into_iter().map(Into::into));
        self
    }

    /// Per-asset RNG: stable across runs and platforms for a given seed.
    fn asset_rng(&self, asset: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ fnv1a(asset.as_bytes()))
    }

    fn draw_params(&self, rng: &mut StdRng) -> GbmParams {
        GbmParams {
            drift: draw(rng, self.drift_range),
            volatility: draw(rng, self.vol_range),
            end_price: draw(rng, self.price_range),
        }
    }

    /// GBM parameters drawn for an asset.
    pub fn params_for(&self, asset: &str) -> GbmParams {
        self.draw_params(&mut self.asset_rng(asset))
    }

    /// Closes for `days` trading days ending at the end date.
    pub fn path(&self, asset: &str, days: usize) -> Vec<f64> {
        let mut rng = self.asset_rng(asset);
        let params = self.draw_params(&mut rng);

        let mut closes = Vec::with_capacity(days);
        let mut price = params.end_price;
        for _ in 0..days {
            closes.push(round_cents(price));
            let z: f64 = StandardNormal.sample(&mut rng);
            price /= params.log_step(z).exp();
        }
        closes.reverse();
        closes
    }

    fn generate(&self, assets: &[AssetId], lookback_days: i64) -> Result<DatedPriceSeries, FeedError> {
        let calendar = trading_days(self.end_date, lookback_days);

        let mut closes = Vec::with_capacity(assets.len());
        for asset in assets {
            if self.unavailable.contains(asset) {
                tracing::warn!(asset = %asset, "Asset not found in synthetic feed, skipping");
                continue;
            }
            closes.push((asset.clone(), self.path(asset, calendar.len())));
        }

        let prices = PriceSeries::new(closes);
        if prices.is_empty() {
            return Err(FeedError::NoData(assets.join(", ")));
        }
        tracing::info!(
            assets = prices.len(),
            days = calendar.len(),
            "Generated synthetic price history"
        );
        Ok(DatedPriceSeries::new(prices, to_iso(&calendar)))
    }
}

#[async_trait]
impl PriceSeriesSource for SyntheticFeed {
    async fn fetch_prices(&self, assets: &[AssetId], lookback_days: u32) -> RiskResult<PriceSeries> {
        Ok(self.generate(assets, i64::from(lookback_days))?.prices)
    }

    async fn fetch_dated_prices(
        &self,
        assets: &[AssetId],
        lookback_years: u32,
    ) -> RiskResult<DatedPriceSeries> {
        Ok(self.generate(assets, i64::from(lookback_years) * DAYS_PER_YEAR)?)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

fn draw(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn round_cents(price: f64) -> f64 {
    ((price * 100.0).round() / 100.0).max(0.01)
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
