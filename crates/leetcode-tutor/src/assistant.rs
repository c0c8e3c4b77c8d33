//! The tutoring assistant: a fixed system prompt in front of the transcript.
//!
//! [`Assistant`] is the seam the [`Tutor`](crate::session::Tutor) talks to.
//! [`TutorAssistant`] is the production implementation backed by
//! [`ChatClient`].

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

pub use crate::AssistantError;
use crate::{ChatClient, ChatRequest, Message, UsageInfo};

/// System prompt prepended to every request.
pub const TUTOR_SYSTEM_PROMPT: &str = "You are an AI tutor helping users understand coding problems. \
Your responses should be structured with the following subheadings: \
1. Intuition, 2. Approach Discussion In Points with Subpoints Using Example For Each Approach, \
3. Example In Tabular Format, 4. Time & Space Complexity. \
Do not provide direct answers. Instead, focus on guiding questions, related examples, \
and thought-provoking hints to help the user think through the problem.";

/// A model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub usage: Option<UsageInfo>,
}

/// Boxed future returned by [`Assistant::reply`].
pub type ReplyFuture<'a> = Pin<Box<dyn Future<Output = Result<Reply, AssistantError>> + Send + 'a>>;

/// Something that answers a transcript.
pub trait Assistant: Send + Sync {
    /// Model identifier, used for cost estimation.
    fn model(&self) -> &str;

    /// Produce the next assistant message for `transcript`.
    fn reply<'a>(&'a self, transcript: &'a [Message]) -> ReplyFuture<'a>;
}

/// Build the full message list sent to the model.
pub fn guided_messages(transcript: &[Message]) -> Vec<Message> {
    std::iter::once(Message::system(TUTOR_SYSTEM_PROMPT))
        .chain(transcript.iter().cloned())
        .collect()
}

/// Chat-completion backed [`Assistant`].
pub struct TutorAssistant {
    client: ChatClient,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl TutorAssistant {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn request(&self, transcript: &[Message]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: guided_messages(transcript),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    async fn complete(&self, transcript: &[Message]) -> Result<Reply, AssistantError> {
        let completion = self.client.chat(&self.request(transcript)).await?;
        let text = completion
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or(AssistantError::EmptyResponse)?;
        debug!("Reply received: {} chars", text.len());
        Ok(Reply {
            text,
            usage: completion.usage,
        })
    }
}

impl Assistant for TutorAssistant {
    fn model(&self) -> &str {
        &self.model
    }

    fn reply<'a>(&'a self, transcript: &'a [Message]) -> ReplyFuture<'a> {
        Box::pin(self.complete(transcript))
    }
}
