//! Console rendering of pipeline results.

use risk_core::RiskReport;
use std::fmt::Write;

/// Width of banner rules.
pub const RULE_WIDTH: usize = 60;

/// A titled banner between two rules.
pub fn banner(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{rule}\n   {title}\n{rule}")
}

/// Compact metrics table printed ahead of the narrated report.
pub fn metrics_summary(report: &RiskReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Value at Risk (95%, 1-day): {:.2}%", report.value_at_risk * 100.0);
    let _ = writeln!(out, "Sharpe ratio:               {:.4}", report.sharpe_ratio);
    let _ = writeln!(out, "Annualised volatility:");
    for (asset, vol) in &report.volatility_scores {
        let _ = writeln!(out, "  {asset:<8} {:>7.2}%", vol * 100.0);
    }
    out.push_str(&report.stress_test_summary);
    out
}
