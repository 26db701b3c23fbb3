//! Construction of the price source and text generator from configuration.

use crate::config::{AnalyzerConfig, SourceKind};
use crate::error::{AnalyzerError, Result};
use adapter_feeds::{CsvFeed, SyntheticFeed};
use adapter_llm::{ChatSettings, OpenAiChatGenerator};
use risk_core::{PriceSeriesSource, TextGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Price source selected by `[source]`.
pub fn price_source(config: &AnalyzerConfig) -> Arc<dyn PriceSeriesSource> {
    let source = &config.source;
    match source.kind {
        SourceKind::Synthetic => {
            let end = source
                .end_date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            tracing::info!(seed = source.seed, end_date = %end, "Using synthetic price feed");
            Arc::new(SyntheticFeed::new(source.seed, end))
        }
        SourceKind::Csv => {
            let feed = CsvFeed::new(&source.data_dir);
            tracing::info!(data_dir = %feed.data_dir().display(), "Using CSV price feed");
            match source.end_date {
                Some(end) => Arc::new(feed.with_end_date(end)),
                None => Arc::new(feed),
            }
        }
    }
}

/// Chat-completions generator configured by `[llm]`.
///
/// The API key is read from the environment variable named by
/// `llm.api_key_env`; an unset or empty variable sends no credentials.
pub fn text_generator(config: &AnalyzerConfig) -> Result<Arc<dyn TextGenerator>> {
    let llm = &config.llm;
    let api_key = std::env::var(&llm.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty());

    let generator = OpenAiChatGenerator::new(ChatSettings {
        endpoint: llm.endpoint.clone(),
        model: llm.model.clone(),
        temperature: llm.temperature,
        api_key,
        timeout: Duration::from_secs(llm.timeout_secs),
    })
    .map_err(|e| AnalyzerError::setup(e.to_string()))?;

    tracing::info!(endpoint = %llm.endpoint, model = %llm.model, "Using chat-completions generator");
    Ok(Arc::new(generator))
}
