//! Session state and the two user actions that drive it.
//!
//! A [`Session`] owns everything that lives for one interactive run: the
//! loaded problem, the transcript, and token accounting. The [`Tutor`]
//! borrows a problem source and an assistant and applies the "load a
//! problem" and "ask a follow-up" actions to a session passed in by the
//! caller.

use tracing::{debug, info};

use crate::api::usage::{CostTracker, generate_trace_id, pricing_for_model};
use crate::assistant::{Assistant, AssistantError};
use crate::conversation::Conversation;
use crate::format::format_response;
use crate::problem::{FetchError, ProblemData, ProblemSource, extract_title_slug};

/// Errors surfaced by [`Tutor`] actions.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error("no problem loaded yet; enter a LeetCode problem URL first")]
    NoProblemLoaded,
    #[error("question is empty")]
    EmptyQuestion,
}

/// State for one interactive tutoring session.
#[derive(Debug)]
pub struct Session {
    trace_id: String,
    problem: Option<ProblemData>,
    conversation: Conversation,
    usage: CostTracker,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            trace_id: generate_trace_id(),
            problem: None,
            conversation: Conversation::new(),
            usage: CostTracker::new(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// The currently loaded problem, if any.
    pub fn problem(&self) -> Option<&ProblemData> {
        self.problem.as_ref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn usage(&self) -> &CostTracker {
        &self.usage
    }

    /// Whether follow-up questions are accepted.
    pub fn is_active(&self) -> bool {
        self.problem.is_some() && self.conversation.is_active()
    }
}

/// Result of loading a problem: the problem plus the formatted first guidance.
#[derive(Debug, Clone)]
pub struct LoadedProblem {
    pub problem: ProblemData,
    pub guidance: String,
}

/// Applies user actions to a [`Session`].
pub struct Tutor<'a> {
    source: &'a dyn ProblemSource,
    assistant: &'a dyn Assistant,
}

impl<'a> Tutor<'a> {
    pub fn new(source: &'a dyn ProblemSource, assistant: &'a dyn Assistant) -> Self {
        Self { source, assistant }
    }

    /// Fetch the problem at `url`, restart the conversation around it, and
    /// ask for the first round of guidance.
    ///
    /// A malformed URL or failed fetch leaves `session` untouched. Once the
    /// fetch succeeds the new problem replaces the old one even if the
    /// assistant then fails.
    pub async fn load_problem(
        &self,
        session: &mut Session,
        url: &str,
    ) -> Result<LoadedProblem, TutorError> {
        let slug = extract_title_slug(url.trim())?;
        info!(trace_id = %session.trace_id, "Fetching problem '{slug}'");

        let problem = self.source.fetch(&slug).await?;
        info!(trace_id = %session.trace_id, "Loaded '{}'", problem.title);

        session.conversation.reset(&problem);
        session.problem = Some(problem.clone());

        let guidance = self.respond(session).await?;
        Ok(LoadedProblem { problem, guidance })
    }

    /// Append a follow-up question and return the formatted reply.
    ///
    /// The question stays in the transcript even if the assistant fails.
    pub async fn ask(&self, session: &mut Session, question: &str) -> Result<String, TutorError> {
        if !session.is_active() {
            return Err(TutorError::NoProblemLoaded);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(TutorError::EmptyQuestion);
        }

        session.conversation.append_user(question);
        self.respond(session).await
    }

    async fn respond(&self, session: &mut Session) -> Result<String, TutorError> {
        debug!(
            trace_id = %session.trace_id,
            "Requesting reply for {} message(s)",
            session.conversation.len()
        );
        let reply = self
            .assistant
            .reply(session.conversation.messages())
            .await?;

        session.usage.record(
            reply.usage.as_ref(),
            &pricing_for_model(self.assistant.model()),
        );
        let formatted = format_response(&reply.text);
        session.conversation.append_assistant(reply.text);
        Ok(formatted)
    }
}
