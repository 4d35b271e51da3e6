//! sa-backend: Chat completion adapters for scriptagent.
//!
//! Every provider implements [`ChatBackend`]: one blocking round trip that
//! sends the whole conversation and returns the reply text. No streaming,
//! no tools, no retries.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use sa_protocol::Turn;

pub mod anthropic;
pub mod error;
pub mod mock;
pub mod openai;

#[cfg(test)]
mod test_server;

pub use anthropic::AnthropicClient;
pub use error::ApiError;
pub use mock::{MockBackend, MockReply};
pub use openai::OpenAiClient;

/// Default system instruction sent with every request.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful and friendly AI assistant. Explain things simply.";

/// Build an HTTP client with appropriate timeouts and connection limits.
pub(crate) fn build_http_client() -> Result<Client, ApiError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(2)
        .build()?;
    Ok(client)
}

/// A hosted chat completion API.
pub trait ChatBackend {
    /// Send `history` followed by `new_user_text` and return the reply text.
    fn complete(
        &self,
        history: &[Turn],
        new_user_text: &str,
    ) -> impl Future<Output = Result<String, ApiError>>;

    /// Short provider name for logs and the startup banner.
    fn name(&self) -> &'static str;
}

/// Provider selected at startup from configuration.
pub enum Backend {
    OpenAi(OpenAiClient),
    Anthropic(AnthropicClient),
}

impl ChatBackend for Backend {
    async fn complete(&self, history: &[Turn], new_user_text: &str) -> Result<String, ApiError> {
        match self {
            Backend::OpenAi(client) => client.complete(history, new_user_text).await,
            Backend::Anthropic(client) => client.complete(history, new_user_text).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Backend::OpenAi(client) => client.name(),
            Backend::Anthropic(client) => client.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_http_client_does_not_fail() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn backend_names() {
        let openai = Backend::OpenAi(OpenAiClient::new("k").unwrap());
        assert_eq!(openai.name(), "openai");

        let anthropic = Backend::Anthropic(AnthropicClient::new("k").unwrap());
        assert_eq!(anthropic.name(), "anthropic");
    }
}
