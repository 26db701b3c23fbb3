//! OpenAI-compatible chat-completions generator.

use crate::chat::{ChatRequest, ChatResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use risk_core::{RiskResult, TextGenerator};
use std::time::Duration;

/// Default public endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Connection settings for [`OpenAiChatGenerator`].
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Bearer token, omitted from the request when `None`
    pub api_key: Option<String>,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Text generator backed by a chat-completions endpoint.
///
/// One request per call, no retries.
pub struct OpenAiChatGenerator {
    settings: ChatSettings,
    client: reqwest::Client,
}

impl OpenAiChatGenerator {
    /// Build the generator and its HTTP client.
    pub fn new(settings: ChatSettings) -> Result<Self, LlmError> {
        if settings.api_key.is_none() {
            tracing::warn!(endpoint = %settings.endpoint, "No API key configured, sending unauthenticated requests");
        }
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Settings in use.
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Full completions URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.endpoint.trim_end_matches('/'))
    }

    /// Send one prompt and return the first completion's text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest::user(&self.settings.model, self.settings.temperature, prompt);
        let url = self.completions_url();
        tracing::debug!(url = %url, model = %self.settings.model, prompt_chars = prompt.len(), "Requesting completion");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::status(status.as_u16(), &body));
        }

        let text = ChatResponse::from_body(&body)?.into_text()?;
        tracing::debug!(response_chars = text.len(), "Completion received");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatGenerator {
    async fn generate(&self, prompt: &str) -> RiskResult<String> {
        Ok(self.complete(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_joins_cleanly() {
        let generator = OpenAiChatGenerator::new(ChatSettings {
            endpoint: "http://localhost:8000/v1/".to_string(),
            ..ChatSettings::default()
        })
        .unwrap();
        assert_eq!(
            generator.completions_url(),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = ChatSettings::default();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.temperature, 0.0);
        assert!(settings.api_key.is_none());
    }
}
