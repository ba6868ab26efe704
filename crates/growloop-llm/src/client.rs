//! Messages-API client for text generation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::LlmError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for single-prompt completions.
///
/// Each call sends one user message and returns the first text block of the
/// response. Batch pacing is the caller's concern (see [`crate::Pacer`]).
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, max_tokens: u32) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        })
    }

    /// Override the API base URL. Intended for tests against a local mock.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send one prompt and return the completion text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] on transport failure, [`LlmError::Api`] on
    /// a non-success status, and [`LlmError::EmptyCompletion`] when the
    /// response carries no text block.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model call failed");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(LlmError::EmptyCompletion)?;
        debug!(chars = text.len(), "received completion");
        Ok(text)
    }
}
