//! OpenAI chat completions client.

use reqwest::Client;
use sa_protocol::Turn;
use serde::{Deserialize, Serialize};

use crate::error::{read_success_body, ApiError};
use crate::{build_http_client, ChatBackend, DEFAULT_SYSTEM_PROMPT};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI API client.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    system_prompt: String,
    http: Client,
}

impl OpenAiClient {
    /// Create a new client with the given API key and default settings.
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

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// An empty prompt omits the system message entirely.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ChatBackend for OpenAiClient {
    async fn complete(&self, history: &[Turn], new_user_text: &str) -> Result<String, ApiError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: build_messages(&self.system_prompt, history, new_user_text),
        };

        tracing::debug!(
            model = %self.model,
            turns = history.len(),
            "openai_request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let text = read_success_body(response).await?;
        let parsed: ChatResponse = serde_json::from_str(&text)?;
        extract_reply(parsed)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

fn build_messages(system_prompt: &str, history: &[Turn], new_user_text: &str) -> Vec<ApiMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    if !system_prompt.is_empty() {
        messages.push(ApiMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
    }

    for turn in history {
        messages.push(ApiMessage {
            role: turn.role().as_str().to_string(),
            content: turn.text().to_string(),
        });
    }

    messages.push(ApiMessage {
        role: "user".to_string(),
        content: new_user_text.to_string(),
    });

    messages
}

fn extract_reply(response: ChatResponse) -> Result<String, ApiError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.is_empty())
        .ok_or(ApiError::Empty)
}

// API request/response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
