use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::llm::client::{LlmError, LlmProvider, SummaryRequest};
use crate::llm::prompts::{build_summary_prompt, PING_PROMPT, SYSTEM_PROMPT};

const DEFAULT_GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "mixtral-8x7b-32768";
const EMPTY_COMPLETION: &str = "Unable to generate summary.";
const PING_MAX_TOKENS: u32 = 10;

/// Groq chat-completions client (OpenAI-compatible API).
pub struct GroqClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let model = if settings.llm.model.trim().is_empty() {
            DEFAULT_GROQ_MODEL.to_string()
        } else {
            settings.llm.model.trim().to_string()
        };

        let endpoint = if settings.llm.endpoint.trim().is_empty() {
            DEFAULT_GROQ_ENDPOINT.to_string()
        } else {
            settings
                .llm
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.llm.timeout_secs))
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model,
            endpoint,
            temperature: settings.llm.temperature,
            max_tokens: settings.llm.max_tokens,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    async fn complete(&self, body: &ChatCompletionRequest<'_>) -> Result<Option<String>, LlmError> {
        debug!(model = %self.model, messages = body.messages.len(), "Sending chat completion");

        let response = self
            .http
            .post(self.request_url())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatCompletionResponse = response.json().await?;
        let choice = payload.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;

        Ok(choice.message.content.filter(|c| !c.trim().is_empty()))
    }
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, LlmError> {
        let prompt = build_summary_prompt(request.transcript, request.instruction);

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
            top_p: Some(1.0),
        };

        let summary = self
            .complete(&body)
            .await?
            .unwrap_or_else(|| EMPTY_COMPLETION.to_string());

        Ok(summary)
    }

    async fn ping(&self) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: PING_PROMPT,
            }],
            temperature: None,
            max_tokens: PING_MAX_TOKENS,
            top_p: None,
        };

        Ok(self.complete(&body).await?.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
