//! Chat-completions wire format.
//!
//! Only the fields the analyzer sends or reads are modelled; unknown
//! response fields are ignored.

use crate::error::LlmError;
use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest<'a> {
    /// Model name
    pub model: &'a str,
    /// Sampling temperature
    pub temperature: f64,
    /// Conversation, a single user turn here
    pub messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    /// Single-turn request carrying `prompt` as the user message.
    pub fn user(model: &'a str, temperature: f64, prompt: &'a str) -> Self {
        Self {
            model,
            temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage<'a> {
    /// Speaker role
    pub role: &'a str,
    /// Message text
    pub content: &'a str,
}

/// Response body of a completion.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Candidate completions
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One candidate completion.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    pub message: ResponseMessage,
}

/// Generated message.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// Message text; absent for tool-call-only replies
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Parse a raw response body.
    pub fn from_body(body: &str) -> Result<Self, LlmError> {
        serde_json::from_str(body).map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }

    /// Text of the first choice.
    pub fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyCompletion)
    }
}
