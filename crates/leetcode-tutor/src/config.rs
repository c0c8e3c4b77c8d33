//! Tutor configuration with sensible defaults.
//!
//! [`TutorConfig`] captures every knob the binary exposes and turns it into
//! a [`ProblemFetcher`] and a [`TutorAssistant`] via
//! [`build_fetcher`](TutorConfig::build_fetcher) and
//! [`build_assistant`](TutorConfig::build_assistant).

use std::time::Duration;

use crate::api::retry::RetryConfig;
use crate::assistant::TutorAssistant;
use crate::problem::{FetchError, ProblemFetcher};
use crate::{
    API_KEY_ENV, AssistantError, BROWSER_USER_AGENT, ChatClient, DEFAULT_MODEL, DEFAULT_TIMEOUT,
    LEETCODE_GRAPHQL_URL, OPENAI_CHAT_URL,
};

/// Configuration for a tutoring session.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Chat model identifier. Default: `"gpt-4"`.
    pub model: String,
    /// Maximum tokens per reply. Default: unset (service default).
    pub max_tokens: Option<u32>,
    /// Sampling temperature. Default: unset (service default).
    pub temperature: Option<f32>,
    /// Retries for transient failures on either call. Default: `0`.
    pub retries: u32,
    /// Per-request timeout. Default: 120 seconds.
    pub timeout: Duration,
    /// GraphQL endpoint for problem details.
    pub graphql_url: String,
    /// Chat-completion endpoint.
    pub chat_url: String,
    /// Environment variable holding the API key. Default: `"OPENAI_API_KEY"`.
    pub api_key_env: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
            retries: 0,
            timeout: DEFAULT_TIMEOUT,
            graphql_url: LEETCODE_GRAPHQL_URL.to_string(),
            chat_url: OPENAI_CHAT_URL.to_string(),
            api_key_env: API_KEY_ENV.to_string(),
        }
    }
}

impl TutorConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_retries(self.retries)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, AssistantError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AssistantError::MissingApiKey(self.api_key_env.clone()))
    }

    /// Build the GraphQL problem fetcher.
    pub fn build_fetcher(&self) -> Result<ProblemFetcher, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(ProblemFetcher::with_client(
            client,
            self.graphql_url.clone(),
            self.retry_config(),
        ))
    }

    /// Build the chat-backed assistant.
    pub fn build_assistant(&self, api_key: impl Into<String>) -> Result<TutorAssistant, AssistantError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("leetcode-tutor/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(AssistantError::Client)?;
        let chat = ChatClient::with_client(
            client,
            api_key,
            self.chat_url.clone(),
            self.retry_config(),
        );
        Ok(TutorAssistant::new(chat, self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature))
    }
}
