//! CSV directory feed.
//!
//! Each asset lives in `<data_dir>/<ASSET>.csv` with a header row and at
//! least the columns `date` (ISO `YYYY-MM-DD`) and `close`. Extra columns are
//! ignored, rows with an empty close are skipped.

use crate::calendar::{to_iso, DAYS_PER_YEAR};
use crate::error::FeedError;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use risk_core::{AssetId, DatedPriceSeries, PriceSeries, PriceSeriesSource, RiskResult};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CloseRow {
    date: NaiveDate,
    close: Option<f64>,
}

type History = Vec<(NaiveDate, f64)>;

/// Reads closes from one CSV file per asset.
#[derive(Debug, Clone)]
pub struct CsvFeed {
    data_dir: PathBuf,
    end_date: Option<NaiveDate>,
}

impl CsvFeed {
    /// Feed over `data_dir`. The lookback ends at the latest date found.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            end_date: None,
        }
    }

    /// Pin the lookback end date.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Directory the feed reads from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File holding an asset's closes.
    pub fn path_for(&self, asset: &str) -> PathBuf {
        self.data_dir.join(format!("{asset}.csv"))
    }

    /// Parse one asset file into date-sorted `(date, close)` rows.
    ///
    /// Duplicate dates keep the last row.
    pub fn read_history(&self, asset: &str) -> Result<History, FeedError> {
        let path = self.path_for(asset);
        let mut reader = csv::Reader::from_path(&path).map_err(|e| FeedError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut by_date = BTreeMap::new();
        for row in reader.deserialize::<CloseRow>() {
            let row = row.map_err(|e| FeedError::Csv {
                path: path.clone(),
                message: e.to_string(),
            })?;
            match row.close {
                Some(close) if close.is_finite() => {
                    by_date.insert(row.date, close);
                }
                _ => tracing::debug!(asset = %asset, date = %row.date, "Skipping row without close"),
            }
        }
        Ok(by_date.into_iter().collect())
    }

    /// Load every readable asset file; failures are logged and skipped.
    fn load(&self, assets: &[AssetId]) -> BTreeMap<AssetId, History> {
        let mut loaded = BTreeMap::new();
        for asset in assets {
            match self.read_history(asset) {
                Ok(history) if !history.is_empty() => {
                    loaded.insert(asset.clone(), history);
                }
                Ok(_) => tracing::warn!(asset = %asset, "Price file has no usable rows, skipping"),
                Err(e) => tracing::warn!(asset = %asset, error = %e, "Price file unavailable, skipping"),
            }
        }
        loaded
    }

    /// Lookback window `[end - lookback_days, end]` for the loaded data.
    fn window(
        &self,
        loaded: &BTreeMap<AssetId, History>,
        lookback_days: i64,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let end = self
            .end_date
            .or_else(|| loaded.values().filter_map(|h| h.last().map(|(d, _)| *d)).max())?;
        Some((end - Duration::days(lookback_days.max(0)), end))
    }

    fn in_window(
        &self,
        assets: &[AssetId],
        lookback_days: i64,
    ) -> Result<BTreeMap<AssetId, History>, FeedError> {
        let loaded = self.load(assets);
        let (start, end) = self
            .window(&loaded, lookback_days)
            .ok_or_else(|| FeedError::NoData(assets.join(", ")))?;

        let trimmed: BTreeMap<_, _> = loaded
            .into_iter()
            .map(|(asset, history)| {
                let kept = history
                    .into_iter()
                    .filter(|(d, _)| *d >= start && *d <= end)
                    .collect::<History>();
                (asset, kept)
            })
            .collect();
        tracing::debug!(%start, %end, assets = trimmed.len(), "Loaded CSV price history");
        Ok(trimmed)
    }

    /// Closes on the dates every usable asset has, with those dates.
    ///
    /// Assets with fewer than two rows in the window are dropped first.
    fn aligned(
        &self,
        assets: &[AssetId],
        lookback_days: i64,
    ) -> Result<(PriceSeries, Vec<NaiveDate>), FeedError> {
        let trimmed: BTreeMap<_, _> = self
            .in_window(assets, lookback_days)?
            .into_iter()
            .filter(|(asset, history)| {
                let usable = history.len() >= 2;
                if !usable {
                    tracing::warn!(asset = %asset, "Too little history in window, skipping");
                }
                usable
            })
            .collect();

        let common = trimmed
            .values()
            .map(|h| h.iter().map(|(d, _)| *d).collect::<BTreeSet<_>>())
            .reduce(|acc, dates| acc.intersection(&dates).copied().collect())
            .unwrap_or_default();
        if common.len() < 2 {
            return Err(FeedError::NoData(assets.join(", ")));
        }

        let prices = PriceSeries::new(trimmed.into_iter().map(|(asset, history)| {
            let before = history.len();
            let closes = history
                .into_iter()
                .filter(|(d, _)| common.contains(d))
                .map(|(_, c)| c)
                .collect::<Vec<_>>();
            if closes.len() < before {
                tracing::debug!(
                    asset = %asset,
                    dropped = before - closes.len(),
                    "Dropped dates missing from other assets"
                );
            }
            (asset, closes)
        }));
        Ok((prices, common.into_iter().collect()))
    }

    fn prices(&self, assets: &[AssetId], lookback_days: i64) -> Result<PriceSeries, FeedError> {
        self.aligned(assets, lookback_days).map(|(prices, _)| prices)
    }

    fn dated_prices(
        &self,
        assets: &[AssetId],
        lookback_days: i64,
    ) -> Result<DatedPriceSeries, FeedError> {
        let (prices, dates) = self.aligned(assets, lookback_days)?;
        Ok(DatedPriceSeries::new(prices, to_iso(&dates)))
    }
}

#[async_trait]
impl PriceSeriesSource for CsvFeed {
    async fn fetch_prices(&self, assets: &[AssetId], lookback_days: u32) -> RiskResult<PriceSeries> {
        Ok(self.prices(assets, i64::from(lookback_days))?)
    }

    async fn fetch_dated_prices(
        &self,
        assets: &[AssetId],
        lookback_years: u32,
    ) -> RiskResult<DatedPriceSeries> {
        Ok(self.dated_prices(assets, i64::from(lookback_years) * DAYS_PER_YEAR)?)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
