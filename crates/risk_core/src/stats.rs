//! Statistics kernels on return samples.
//!
//! Pure functions on `&[f64]`. Sample statistics use population
//! conventions (divide by `n`), percentiles interpolate linearly between
//! order statistics.

use crate::error::{RiskError, RiskResult};

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> RiskResult<f64> {
    if values.is_empty() {
        return Err(RiskError::no_data("mean of an empty sample"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_std_dev(values: &[f64]) -> RiskResult<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Percentile `p` in `[0, 100]` with linear interpolation between order
/// statistics.
///
/// # Examples
///
/// ```
/// use risk_core::stats::percentile;
///
/// let p = percentile(&[4.0, 1.0, 3.0, 2.0, 5.0], 50.0).unwrap();
/// assert_eq!(p, 3.0);
/// ```
pub fn percentile(values: &[f64], p: f64) -> RiskResult<f64> {
    if values.is_empty() {
        return Err(RiskError::no_data("percentile of an empty sample"));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(RiskError::numeric(format!("percentile {p} outside [0, 100]")));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RiskError::numeric("percentile of a non-finite sample"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Pearson correlation coefficient of two paired samples.
///
/// Samples of unequal length are aligned on their overlapping trailing
/// window, i.e. both are truncated to the most recent `min(len)`
/// observations. Returns `None` when fewer than two pairs remain or either
/// side has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let x = &x[x.len() - n..];
    let y = &y[y.len() - n..];

    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    let r = cov / (vx * vy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Compounded return over a run of simple returns: `∏(1 + r) - 1`.
pub fn compound_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Round to `decimals` decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
