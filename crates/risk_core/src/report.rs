//! Report stage: narrate the risk metrics through a text generator.

use crate::error::RiskResult;
use crate::traits::TextGenerator;
use crate::types::{FinalReport, Portfolio, RiskRating, RiskReport};
use std::fmt::Write as _;
use std::sync::Arc;

/// Literal prefix of the rating line the generator is asked to emit.
pub const RATING_PREFIX: &str = "RISK RATING:";

/// Render the prompt for a risk report.
///
/// Deterministic for a given input: assets appear in identifier order and
/// each unordered correlation pair `{a, b}` appears once, as `a vs b` with
/// `a < b`.
pub fn render_prompt(portfolio: &Portfolio, report: &RiskReport) -> String {
    let mut correlations = String::new();
    for (a, row) in &report.correlation_matrix {
        for (b, value) in row {
            if a < b {
                let _ = writeln!(correlations, "  {a} vs {b}: {value}");
            }
        }
    }

    let volatility = report
        .volatility_scores
        .iter()
        .map(|(asset, score)| format!("  {asset}: {:.1}% annualized volatility", score * 100.0))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a senior financial risk analyst. Based on the following quantitative data, \
write a professional portfolio risk report and assign a final risk rating.

PORTFOLIO ALLOCATIONS:
{portfolio}

MARKET RISK:
- Value at Risk (95% confidence): {var:.2}% potential daily loss
- Stress Test: {stress}

VOLATILITY:
{volatility}

SHARPE RATIO: {sharpe}
(Above 1.0 = good, above 2.0 = excellent, below 0 = underperforming risk-free rate)

ASSET CORRELATIONS:
{correlations}
Please provide:
1. A brief executive summary (2-3 sentences)
2. Key risk findings from the data above
3. Diversification assessment based on the correlation matrix
4. A final risk rating: Low, Medium, or High, with justification

Write in a clear, professional tone suitable for an investment committee.
End your response with a line that says exactly: {RATING_PREFIX} <Low/Medium/High>
",
        var = report.value_at_risk * 100.0,
        stress = report.stress_test_summary,
        sharpe = report.sharpe_ratio,
    )
}

/// Extract the rating from generated text.
///
/// Takes the first line that begins with [`RATING_PREFIX`]; anything that is
/// not Low/Medium/High, or no such line at all, gives
/// [`RiskRating::Unknown`]. Never fails.
pub fn parse_rating(text: &str) -> RiskRating {
    text.lines()
        .find_map(|line| line.strip_prefix(RATING_PREFIX))
        .map_or(RiskRating::Unknown, RiskRating::from_label)
}

/// Report stage.
pub struct ReportStage {
    generator: Arc<dyn TextGenerator>,
}

impl ReportStage {
    /// Create a stage around an injected generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Render the prompt, call the generator and parse the rating.
    ///
    /// Generator failures propagate; a missing rating does not.
    pub async fn run(&self, portfolio: &Portfolio, report: &RiskReport) -> RiskResult<FinalReport> {
        tracing::info!("Synthesizing final report");
        let prompt = render_prompt(portfolio, report);
        tracing::debug!(prompt_len = prompt.len(), "Prompt rendered");

        let text = self.generator.generate(&prompt).await?;
        let rating = parse_rating(&text);
        if rating == RiskRating::Unknown {
            tracing::warn!("Generated report carries no recognisable risk rating");
        }
        tracing::info!(rating = %rating, "Report generated");

        Ok(FinalReport { text, rating })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct Scripted {
        reply: RiskResult<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(reply: RiskResult<String>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> RiskResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn sample_report() -> RiskReport {
        let mut corr = BTreeMap::new();
        corr.insert(
            "AAPL".to_string(),
            BTreeMap::from([("AAPL".to_string(), 1.0), ("MSFT".to_string(), 0.62)]),
        );
        corr.insert(
            "MSFT".to_string(),
            BTreeMap::from([("AAPL".to_string(), 0.62), ("MSFT".to_string(), 1.0)]),
        );
        RiskReport {
            value_at_risk: 0.0213,
            stress_test_summary: "Historical Stress Test".to_string(),
            volatility_scores: BTreeMap::from([
                ("AAPL".to_string(), 0.2512),
                ("MSFT".to_string(), 0.2201),
            ]),
            sharpe_ratio: 1.2345,
            correlation_matrix: corr,
        }
    }

    #[test]
    fn test_prompt_contains_metrics() {
        let portfolio = Portfolio::new([("AAPL", 0.5), ("MSFT", 0.5)]);
        let prompt = render_prompt(&portfolio, &sample_report());
        assert!(prompt.contains("{AAPL: 0.5, MSFT: 0.5}"));
        assert!(prompt.contains("Value at Risk (95% confidence): 2.13% potential daily loss"));
        assert!(prompt.contains("  AAPL: 25.1% annualized volatility"));
        assert!(prompt.contains("SHARPE RATIO: 1.2345"));
        assert!(prompt.contains("RISK RATING: <Low/Medium/High>"));
    }

    #[test]
    fn test_prompt_dedups_correlation_pairs() {
        let portfolio = Portfolio::new([("AAPL", 0.5), ("MSFT", 0.5)]);
        let prompt = render_prompt(&portfolio, &sample_report());
        assert_eq!(prompt.matches("AAPL vs MSFT: 0.62").count(), 1);
        assert!(!prompt.contains("MSFT vs AAPL"));
        assert!(!prompt.contains("AAPL vs AAPL"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let portfolio = Portfolio::new([("MSFT", 0.5), ("AAPL", 0.5)]);
        let reordered = Portfolio::new([("AAPL", 0.5), ("MSFT", 0.5)]);
        assert_eq!(
            render_prompt(&portfolio, &sample_report()),
            render_prompt(&reordered, &sample_report())
        );
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("Summary...\nRISK RATING: Medium"), RiskRating::Medium);
        assert_eq!(parse_rating("RISK RATING:High\nRISK RATING: Low"), RiskRating::High);
        assert_eq!(parse_rating("no rating here"), RiskRating::Unknown);
        assert_eq!(parse_rating("Final RISK RATING: Low"), RiskRating::Unknown);
        assert_eq!(parse_rating(""), RiskRating::Unknown);
    }

    #[tokio::test]
    async fn test_stage_without_rating_line_degrades_to_unknown() {
        let generator = Arc::new(Scripted::new(Ok("A thorough report.".to_string())));
        let stage = ReportStage::new(generator.clone());
        let portfolio = Portfolio::new([("AAPL", 1.0)]);

        let report = stage.run(&portfolio, &sample_report()).await.unwrap();
        assert_eq!(report.rating, RiskRating::Unknown);
        assert_eq!(report.text, "A thorough report.");
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stage_propagates_generation_error() {
        let generator = Arc::new(Scripted::new(Err(RiskError::generation("unreachable"))));
        let stage = ReportStage::new(generator);
        let portfolio = Portfolio::new([("AAPL", 1.0)]);

        let err = stage.run(&portfolio, &sample_report()).await.unwrap_err();
        assert!(matches!(err, RiskError::Generation(_)));
    }
}
