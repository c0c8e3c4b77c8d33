//! Terminal tutor that explains LeetCode problems through a chat model.
//!
//! `leetcode-tutor` fetches a problem description from LeetCode's GraphQL
//! endpoint, seeds a conversation with it, and asks a hosted chat-completion
//! model to guide the user through the problem without handing out the
//! answer. Follow-up questions continue the same conversation.
//!
//! # Getting started
//!
//! ```ignore
//! use leetcode_tutor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TutorError> {
//!     let config = TutorConfig::default();
//!     let fetcher = config.build_fetcher()?;
//!     let assistant = config.build_assistant(std::env::var("OPENAI_API_KEY").unwrap())?;
//!
//!     let tutor = Tutor::new(&fetcher, &assistant);
//!     let mut session = Session::new();
//!
//!     let loaded = tutor
//!         .load_problem(&mut session, "https://leetcode.com/problems/two-sum/")
//!         .await?;
//!     println!("{}", loaded.guidance);
//!
//!     let answer = tutor.ask(&mut session, "Why is a hash map useful here?").await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`problem`] | Slug extraction, GraphQL fetch, statement cleanup |
//! | [`assistant`] | Tutoring system prompt and the [`Assistant`](assistant::Assistant) seam |
//! | [`conversation`] | Transcript bookkeeping for one session |
//! | [`format`] | Reply sectioning and HTML-to-terminal rendering |
//! | [`session`] | [`Session`](session::Session) state and the [`Tutor`](session::Tutor) actions |
//! | [`shell`] | Parsing of interactive shell input |
//! | [`config`] | [`TutorConfig`](config::TutorConfig) defaults and builders |
//! | [`api`] | Retry policy and usage/cost tracking |

pub mod api;
pub mod assistant;
pub mod config;
pub mod conversation;
pub mod format;
pub mod prelude;
pub mod problem;
pub mod session;
pub mod shell;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::api::retry::{RetryConfig, Retryable, with_retry};

// ── Constants ──────────────────────────────────────────────────────

/// Chat-completion endpoint.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// LeetCode GraphQL endpoint.
pub const LEETCODE_GRAPHQL_URL: &str = "https://leetcode.com/graphql";

/// Default model for tutoring replies.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Environment variable holding the chat API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// LeetCode rejects requests without a browser-looking user agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default per-request timeout for both outbound calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Unset optional fields are omitted so the
/// service applies its own defaults.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorResponse,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`ChatClient::chat()`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Errors ─────────────────────────────────────────────────────────

/// Failures talking to the chat-completion service.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("{0} environment variable is not set")]
    MissingApiKey(String),
    #[error("chat API HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("chat API error: {0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("model returned no message")]
    EmptyResponse,
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl Retryable for AssistantError {
    fn is_transient(&self) -> bool {
        match self {
            AssistantError::Http { status, .. } => api::retry::is_transient_status(*status),
            AssistantError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Turn a status code and response body into a [`ChatCompletion`].
///
/// Error bodies in the `{"error": {"message": …}}` shape contribute their
/// message to [`AssistantError::Http`]; other bodies are passed through raw.
pub fn parse_completion(status: u16, text: &str) -> Result<ChatCompletion, AssistantError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiErrorEnvelope>(text)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| text.to_string());
        return Err(AssistantError::Http { status, message });
    }

    let parsed: RawChatResponse = serde_json::from_str(text).map_err(AssistantError::Decode)?;

    if let Some(err) = parsed.error {
        return Err(AssistantError::Api(err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    match parsed.choices.and_then(|c| c.into_iter().next()) {
        Some(c) => {
            debug!(
                "LLM output: {} chars text",
                c.message.content.as_ref().map_or(0, |s| s.len())
            );
            Ok(ChatCompletion {
                content: c.message.content,
                usage: parsed.usage,
                finish_reason: c.finish_reason,
            })
        }
        None => {
            debug!("LLM output: empty (no choices)");
            Ok(ChatCompletion {
                content: None,
                usage: parsed.usage,
                finish_reason: None,
            })
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for a chat-completions API.
pub struct ChatClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) endpoint: String,
    pub(crate) retry: RetryConfig,
}

impl ChatClient {
    /// Create a client for the default endpoint with no retries.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("leetcode-tutor/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(AssistantError::Client)?;
        Ok(Self::with_client(
            client,
            api_key,
            OPENAI_CHAT_URL,
            RetryConfig::default(),
        ))
    }

    /// Create a client from the API key in the given environment variable.
    pub fn from_env(var: &str) -> Result<Self, AssistantError> {
        let api_key =
            std::env::var(var).map_err(|_| AssistantError::MissingApiKey(var.to_string()))?;
        Self::new(api_key)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            retry,
        }
    }

    /// Send a chat completion request, retrying transient failures per the
    /// client's [`RetryConfig`].
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, AssistantError> {
        with_retry(&self.retry, "chat completion", || self.chat_once(body)).await
    }

    async fn chat_once(&self, body: &ChatRequest) -> Result<ChatCompletion, AssistantError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={:?}, temp={:?}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(AssistantError::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(AssistantError::Transport)?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        parse_completion(status.as_u16(), &text)
    }
}
