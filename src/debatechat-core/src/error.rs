//! Error types for the debate system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Unknown style: {0}")]
    UnknownStyle(String),
}

impl DebateError {
    /// Whether this error came from the language-model provider (network,
    /// timeout, rate limit or a provider-side failure).
    pub fn is_provider(&self) -> bool {
        matches!(self, DebateError::Provider(_) | DebateError::OpenAIError(_))
    }
}
