//! Market risk stage: historical VaR and rolling-window stress test.
//!
//! VaR is read off the short-horizon portfolio return distribution. The
//! stress test performs its own long-horizon fetch and scans it for the
//! worst compounded loss over several window lengths.

use crate::error::RiskResult;
use crate::returns::{portfolio_returns, ReturnsSeries};
use crate::stats::{compound_return, percentile, round_to};
use crate::traits::PriceSeriesSource;
use crate::types::{DatedPriceSeries, MarketRiskMetrics, Portfolio, PriceSeries};
use std::sync::Arc;

/// Default VaR confidence level.
pub const DEFAULT_VAR_CONFIDENCE: f64 = 0.95;

/// Default stress-test window lengths in trading days.
pub const DEFAULT_STRESS_WINDOWS: [usize; 3] = [30, 60, 90];

/// Default stress-test lookback in years.
pub const DEFAULT_STRESS_LOOKBACK_YEARS: u32 = 3;

/// Placeholder for a date index that falls outside the calendar.
const MISSING_DATE: &str = "N/A";

/// Historical VaR: absolute value of the `(1 - confidence)` percentile of
/// portfolio returns, rounded to 4 decimals.
///
/// # Examples
///
/// ```
/// use risk_core::market_risk::historical_var;
///
/// let returns = [-0.05, -0.01, 0.0, 0.01, 0.02];
/// // 5th percentile: -0.05 + 0.2 * 0.04 = -0.042
/// assert_eq!(historical_var(&returns, 0.95).unwrap(), 0.042);
/// ```
pub fn historical_var(portfolio_returns: &[f64], confidence: f64) -> RiskResult<f64> {
    // (1 - 0.95) * 100 is not exactly 5 in binary floating point.
    let tail = round_to((1.0 - confidence) * 100.0, 10);
    let p = percentile(portfolio_returns, tail)?;
    Ok(round_to(p.abs(), 4))
}

/// Worst compounded loss found over one window length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorstWindow {
    /// Window length in trading days
    pub window: usize,
    /// Compounded return of the worst window (≤ 0), 4 decimals
    pub loss: f64,
    /// Index into the return series where the worst window starts
    pub start_index: usize,
}

/// Scan every window of `window` consecutive returns and keep the one with
/// the lowest compounded return.
///
/// The running worst starts at 0, so a series with no losing window reports
/// a loss of 0 at index 0. Ties keep the earliest window. A series shorter
/// than the window has no candidate windows.
///
/// Starts run over `0..=len - window`, so the window ending on the last
/// return is scanned too.
pub fn worst_rolling_window(returns: &[f64], window: usize) -> WorstWindow {
    let mut worst_loss = 0.0;
    let mut worst_start = 0;

    if window > 0 && returns.len() >= window {
        for start in 0..=returns.len() - window {
            let total = compound_return(&returns[start..start + window]);
            if total < worst_loss {
                worst_loss = total;
                worst_start = start;
            }
        }
    }

    WorstWindow {
        window,
        loss: round_to(worst_loss, 4),
        start_index: worst_start,
    }
}

/// A worst window mapped onto calendar dates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressPeriod {
    /// Window length in trading days
    pub window: usize,
    /// Compounded return (≤ 0), 4 decimals
    pub loss: f64,
    /// First date of the window
    pub start_date: String,
    /// Last date of the window
    pub end_date: String,
}

impl StressPeriod {
    /// Map a worst window onto the price calendar.
    ///
    /// Return `i` spans prices `i` and `i + 1`, so the window's first date is
    /// `dates[start + 1]`; the end date is `dates[min(start + window, len - 1)]`.
    pub fn from_window(worst: &WorstWindow, dates: &[String]) -> Self {
        let start_date = dates
            .get(worst.start_index + 1)
            .map_or(MISSING_DATE, String::as_str);
        let end_idx = (worst.start_index + worst.window).min(dates.len().saturating_sub(1));
        let end_date = dates.get(end_idx).map_or(MISSING_DATE, String::as_str);

        Self {
            window: worst.window,
            loss: worst.loss,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        }
    }

    /// Loss as a positive percentage.
    pub fn loss_pct(&self) -> f64 {
        self.loss.abs() * 100.0
    }
}

/// Render stress periods as the multi-line summary handed to the report.
pub fn render_stress_summary(periods: &[StressPeriod], lookback_years: u32) -> String {
    let mut lines = vec![format!(
        "Historical Stress Test - Worst Periods (Last {lookback_years} Years):"
    )];
    for p in periods {
        lines.push(format!(
            "  • Worst {}-day period ({} → {}): {:.1}% loss",
            p.window,
            p.start_date,
            p.end_date,
            p.loss_pct()
        ));
    }

    // First period with the largest absolute loss.
    let most_vulnerable = periods.iter().fold(None::<&StressPeriod>, |best, p| match best {
        Some(b) if p.loss.abs() <= b.loss.abs() => Some(b),
        _ => Some(p),
    });
    if let Some(worst) = most_vulnerable {
        lines.push(format!(
            "\n  Most vulnerable period: {} → {} ({}-day window, {:.1}% loss)",
            worst.start_date,
            worst.end_date,
            worst.window,
            worst.loss_pct()
        ));
    }

    lines.join("\n")
}

/// Market risk stage.
///
/// Computes one-day historical VaR from the short-horizon prices handed in
/// by the orchestrator, then fetches a long-horizon history from its own
/// source for the stress test.
pub struct MarketRiskStage {
    source: Arc<dyn PriceSeriesSource>,
    confidence: f64,
    stress_lookback_years: u32,
    windows: Vec<usize>,
}

impl MarketRiskStage {
    /// Create a stage with default confidence, lookback and windows.
    pub fn new(source: Arc<dyn PriceSeriesSource>) -> Self {
        Self {
            source,
            confidence: DEFAULT_VAR_CONFIDENCE,
            stress_lookback_years: DEFAULT_STRESS_LOOKBACK_YEARS,
            windows: DEFAULT_STRESS_WINDOWS.to_vec(),
        }
    }

    /// Set the VaR confidence level.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the stress-test lookback in years.
    pub fn with_stress_lookback_years(mut self, years: u32) -> Self {
        self.stress_lookback_years = years;
        self
    }

    /// Set the stress-test window lengths.
    pub fn with_windows(mut self, windows: Vec<usize>) -> Self {
        self.windows = windows;
        self
    }

    /// Run VaR and the stress test.
    pub async fn run(
        &self,
        portfolio: &Portfolio,
        prices: &PriceSeries,
    ) -> RiskResult<MarketRiskMetrics> {
        tracing::info!(assets = prices.len(), "Starting market risk calculations");

        let value_at_risk = self.value_at_risk(portfolio, prices)?;
        tracing::info!(
            confidence = self.confidence,
            "Value at Risk: {:.2}%",
            value_at_risk * 100.0
        );

        tracing::info!(
            source = self.source.name(),
            years = self.stress_lookback_years,
            "Fetching long-horizon history for stress test"
        );
        let history = self
            .source
            .fetch_dated_prices(&portfolio.assets(), self.stress_lookback_years)
            .await?;

        let periods = self.stress_test(portfolio, &history)?;
        for p in &periods {
            tracing::info!(
                window = p.window,
                start = %p.start_date,
                end = %p.end_date,
                "Worst period loss: {:.1}%",
                p.loss_pct()
            );
        }
        tracing::info!("Stress test complete");

        Ok(MarketRiskMetrics {
            value_at_risk,
            stress_test_summary: render_stress_summary(&periods, self.stress_lookback_years),
        })
    }

    /// One-day historical VaR of the portfolio.
    pub fn value_at_risk(&self, portfolio: &Portfolio, prices: &PriceSeries) -> RiskResult<f64> {
        let returns = ReturnsSeries::from_prices(prices)?;
        let daily = portfolio_returns(&returns, portfolio)?;
        historical_var(&daily, self.confidence)
    }

    /// Worst rolling windows over a dated long-horizon history.
    pub fn stress_test(
        &self,
        portfolio: &Portfolio,
        history: &DatedPriceSeries,
    ) -> RiskResult<Vec<StressPeriod>> {
        let returns = ReturnsSeries::from_prices(&history.prices)?;
        let daily = portfolio_returns(&returns, portfolio)?;
        tracing::debug!(days = daily.len(), "Long-horizon portfolio returns");

        Ok(self
            .windows
            .iter()
            .map(|&w| StressPeriod::from_window(&worst_rolling_window(&daily, w), &history.dates))
            .collect())
    }
}
