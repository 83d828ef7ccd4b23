use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Settings;
use crate::llm::groq::GroqClient;

/// Summary generation request payload.
pub struct SummaryRequest<'a> {
    pub transcript: &'a str,
    pub instruction: &'a str,
}

/// Failures from a summarization provider.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("GROQ_API_KEY is not configured. Set llm.api_key in config or GROQ_API_KEY.")]
    MissingApiKey,

    #[error("Unsupported llm.provider '{0}'. Supported providers: groq")]
    UnsupportedProvider(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider returned no choices")]
    EmptyResponse,
}

impl LlmError {
    /// Configuration failures are fatal and never trigger the fallback.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LlmError::MissingApiKey | LlmError::UnsupportedProvider(_) | LlmError::Client(_)
        )
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, LlmError>;

    /// Round-trip a tiny prompt to confirm credentials and reachability.
    async fn ping(&self) -> Result<String, LlmError>;
}

/// Build an LLM provider from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match settings.llm.provider.to_lowercase().as_str() {
        "groq" => Ok(Arc::new(GroqClient::from_settings(settings)?)),
        other => Err(LlmError::UnsupportedProvider(other.to_string())),
    }
}
