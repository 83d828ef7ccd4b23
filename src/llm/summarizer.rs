//! Summarization workflow: provider first, local fallback on failure.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::client::{LlmError, LlmProvider, SummaryRequest};
use crate::llm::fallback::summarize_fallback;

/// Where a summary's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Provider,
    Fallback,
}

/// A generated summary and its origin.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub text: String,
    pub source: SummarySource,
}

/// Result of a provider connectivity check.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs summaries against an injected provider.
///
/// Built without a provider when credentials are absent; every call then
/// reports [`LlmError::MissingApiKey`] instead of falling back.
#[derive(Clone)]
pub struct Summarizer {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn LlmProvider>, LlmError> {
        self.provider.as_ref().ok_or(LlmError::MissingApiKey)
    }

    /// Summarize `transcript` following `instruction`.
    ///
    /// Configuration failures propagate. Any other provider failure is
    /// logged and answered by exactly one fallback run, which counts as
    /// success from here on.
    pub async fn summarize(
        &self,
        transcript: &str,
        instruction: &str,
    ) -> Result<SummaryOutcome, LlmError> {
        let provider = self.provider()?;

        info!("Generating summary with provider");
        let result = provider
            .summarize(SummaryRequest {
                transcript,
                instruction,
            })
            .await;

        match result {
            Ok(text) => Ok(SummaryOutcome {
                text,
                source: SummarySource::Provider,
            }),
            Err(e) if e.is_configuration() => Err(e),
            Err(e) => {
                warn!("Provider summarization failed, using fallback: {}", e);
                Ok(SummaryOutcome {
                    text: summarize_fallback(transcript, instruction),
                    source: SummarySource::Fallback,
                })
            }
        }
    }

    /// Check that the provider answers a trivial prompt.
    pub async fn test_connection(&self) -> ConnectionTest {
        let result = match self.provider() {
            Ok(provider) => provider.ping().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => ConnectionTest {
                success: true,
                response: Some(response),
                error: None,
            },
            Err(e) => ConnectionTest {
                success: false,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Reply(&'static str),
        Unavailable,
        Misconfigured,
    }

    struct StubProvider {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn respond(&self) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Unavailable => Err(LlmError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
                Behavior::Misconfigured => Err(LlmError::MissingApiKey),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn summarize(&self, _request: SummaryRequest<'_>) -> Result<String, LlmError> {
            self.respond()
        }

        async fn ping(&self) -> Result<String, LlmError> {
            self.respond()
        }
    }

    const TRANSCRIPT: &str = "We agreed on the launch plan. Dana will send the invites.";

    #[tokio::test]
    async fn provider_text_is_returned_as_is() {
        let stub = StubProvider::new(Behavior::Reply("- launch agreed"));
        let summarizer = Summarizer::new(stub.clone());

        let outcome = summarizer.summarize(TRANSCRIPT, "Overview").await.unwrap();
        assert_eq!(outcome.text, "- launch agreed");
        assert_eq!(outcome.source, SummarySource::Provider);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_outage_falls_back_once() {
        let stub = StubProvider::new(Behavior::Unavailable);
        let summarizer = Summarizer::new(stub.clone());

        let outcome = summarizer
            .summarize(TRANSCRIPT, "Action items")
            .await
            .unwrap();
        assert_eq!(outcome.source, SummarySource::Fallback);
        assert_eq!(
            outcome.text,
            summarize_fallback(TRANSCRIPT, "Action items")
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn configuration_failure_propagates() {
        let summarizer = Summarizer::new(StubProvider::new(Behavior::Misconfigured));

        let err = summarizer.summarize(TRANSCRIPT, "Overview").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn unconfigured_summarizer_reports_missing_key() {
        let summarizer = Summarizer::unconfigured();
        assert!(!summarizer.is_configured());

        let err = summarizer.summarize(TRANSCRIPT, "Overview").await.unwrap_err();
        assert!(err.is_configuration());

        let test = summarizer.test_connection().await;
        assert!(!test.success);
        assert!(test.error.unwrap().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn connection_test_reports_reply() {
        let summarizer = Summarizer::new(StubProvider::new(Behavior::Reply("OK")));

        let test = summarizer.test_connection().await;
        assert!(test.success);
        assert_eq!(test.response.as_deref(), Some("OK"));
    }
}
