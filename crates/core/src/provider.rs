//! Language-model completion providers.
//!
//! [`CompletionProvider`] is the seam between the summarizer and the remote
//! model. [`OpenAiProvider`] speaks the OpenAI chat-completions protocol and
//! works against any compatible endpoint.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ProviderError, SynopsisError};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.proxyapi.ru/openai/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Supported summarization models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Model {
    /// Higher-quality tier.
    #[default]
    Gpt4o,
    /// Faster, cheaper tier.
    Gpt35Turbo,
}

impl Model {
    /// Every supported model, default first.
    pub const SUPPORTED: [Model; 2] = [Model::Gpt4o, Model::Gpt35Turbo];

    /// The model name sent to the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    /// Comma-separated list of supported names, for messages.
    pub fn supported_names() -> String {
        Self::SUPPORTED.iter().map(Model::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = SynopsisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .into_iter()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| SynopsisError::UnsupportedModel { model: s.to_string(), supported: Self::supported_names() })
    }
}

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: Model,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Capability for issuing completion requests.
///
/// Implementations report every transport or provider failure as a
/// [`ProviderError`]; retry policy belongs to the caller.
pub trait CompletionProvider: Send + Sync {
    fn complete(&self, request: &CompletionRequest)
    -> impl Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Build a provider for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key: api_key.into(), base_url: base_url.into() })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: request.model.as_str(),
            messages: [
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &request.user_prompt },
            ],
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
        };

        debug!(model = %request.model, endpoint = %self.endpoint(), "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status: status.as_u16(), message });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(content.to_string())
    }
}
