//! Anthropic Messages API client.

use reqwest::Client;
use sa_protocol::Turn;
use serde::{Deserialize, Serialize};

use crate::error::{read_success_body, ApiError};
use crate::{build_http_client, ChatBackend, DEFAULT_SYSTEM_PROMPT};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Anthropic API client.
pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: String,
    http: Client,
}

impl AnthropicClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            http: build_http_client()?,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatBackend for AnthropicClient {
    async fn complete(&self, history: &[Turn], new_user_text: &str) -> Result<String, ApiError> {
        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: self.system_prompt.clone(),
            messages: build_messages(history, new_user_text),
        };

        tracing::debug!(
            model = %self.model,
            turns = history.len(),
            "anthropic_request"
        );

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let text = read_success_body(response).await?;
        let parsed: MessagesResponse = serde_json::from_str(&text)?;
        first_text(parsed)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

fn build_messages(history: &[Turn], new_user_text: &str) -> Vec<ApiMessage> {
    history
        .iter()
        .map(|turn| ApiMessage {
            role: turn.role().as_str().to_string(),
            content: turn.text().to_string(),
        })
        .chain(std::iter::once(ApiMessage {
            role: "user".to_string(),
            content: new_user_text.to_string(),
        }))
        .collect()
}

fn first_text(response: MessagesResponse) -> Result<String, ApiError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ResponseContentBlock::Text { text } => Some(text),
            ResponseContentBlock::Other => None,
        })
        .filter(|text| !text.is_empty())
        .ok_or(ApiError::Empty)
}

// API request/response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}
