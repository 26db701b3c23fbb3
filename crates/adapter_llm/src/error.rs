//! Text generation error types.

use risk_core::RiskError;
use thiserror::Error;

/// Errors raised while calling the chat-completions endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// Request could not be sent or the body not read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status.
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// Response body is not a chat completion.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Completion carried no message content.
    #[error("Response contained no completion text")]
    EmptyCompletion,
}

impl LlmError {
    /// Status error with the body cut to a loggable length.
    pub fn status(status: u16, body: &str) -> Self {
        const MAX_BODY: usize = 512;
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        LlmError::Status { status, body }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Transport(err.to_string())
    }
}

impl From<LlmError> for RiskError {
    fn from(err: LlmError) -> Self {
        RiskError::generation(err.to_string())
    }
}
