/// LLM client: the single point of entry for all model calls in the evaluator.
///
/// Talks to any chat-completion style API (`POST {base_url}/chat/completions`).
/// The endpoint and key are resolved lazily on every call, see `endpoint`.
/// No retries: a failed call surfaces directly to the caller.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod endpoint;
pub mod prompts;

use endpoint::{resolve_endpoint, EndpointSources, LlmEndpoint};

/// Default model when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error(
        "LLM configuration not found. Create {file} or set {key_var} / {url_var}",
        file = endpoint::CONFIG_FILE_NAME,
        key_var = endpoint::API_KEY_VAR,
        url_var = endpoint::BASE_URL_VAR
    )]
    Config,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No response from AI")]
    EmptyContent,

    #[error("Invalid AI response format")]
    InvalidFormat,

    #[error("Model call exceeded {secs}s deadline")]
    Timeout { secs: u64 },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice's message, if non-empty.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Anything that can answer a single-prompt chat completion.
///
/// Carried in `AppState` as `Arc<dyn ChatCompletion>`.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends `prompt` as one user message and returns the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Calls the model and parses the first balanced JSON object in its reply.
    /// The reply may wrap the object in prose or code fences.
    async fn complete_json(&self, prompt: &str) -> Result<Value, LlmError> {
        let text = self.complete(prompt).await?;
        let span = extract_json_object(&text).ok_or(LlmError::InvalidFormat)?;
        let value: Value = serde_json::from_str(span).map_err(|_| LlmError::InvalidFormat)?;
        if !value.is_object() {
            return Err(LlmError::InvalidFormat);
        }
        Ok(value)
    }
}

/// The HTTP-backed chat completion client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    model: String,
    timeout: Duration,
    /// Pinned sources; `None` snapshots the process on every call.
    sources: Option<EndpointSources>,
}

impl LlmClient {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            model: model.into(),
            timeout,
            sources: None,
        })
    }

    /// Resolves the endpoint from these sources instead of the live process.
    pub fn with_sources(mut self, sources: EndpointSources) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> Result<LlmEndpoint, LlmError> {
        let resolved = match &self.sources {
            Some(sources) => resolve_endpoint(sources),
            None => resolve_endpoint(&EndpointSources::from_process()),
        };
        resolved.ok_or(LlmError::Config)
    }

    async fn send(&self, endpoint: &LlmEndpoint, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(endpoint.completions_url())
            .bearer_auth(&endpoint.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let endpoint = self.endpoint()?;
        debug!(
            "Calling {} with model {} (prompt {} chars)",
            endpoint.completions_url(),
            self.model,
            prompt.len()
        );

        let response = tokio::time::timeout(self.timeout, self.send(&endpoint, prompt))
            .await
            .map_err(|_| LlmError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        debug!("LLM response received, length: {}", text.len());
        Ok(text.to_string())
    }
}

/// Returns the first balanced `{...}` span in `text`.
///
/// Braces inside JSON string literals (including escaped quotes) do not count
/// toward nesting. Returns `None` when no opening brace exists or the first one
/// is never closed.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
