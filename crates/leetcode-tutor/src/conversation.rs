//! Transcript bookkeeping for one tutoring session.
//!
//! The transcript is append-only. The only way to shrink it is
//! [`Conversation::reset`], which starts over for a freshly fetched problem.

use crate::problem::ProblemData;
use crate::{Message, MessageRole};

/// System message that opens every session transcript.
pub const SESSION_SYSTEM_PROMPT: &str =
    "You are an AI tutor helping users understand coding problems.";

/// Number of seed messages written by [`Conversation::reset`].
const SEED_LEN: usize = 2;

/// Ordered, role-tagged messages for the active session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the transcript with the system prompt and a user message
    /// describing `problem`.
    pub fn reset(&mut self, problem: &ProblemData) {
        self.messages = vec![
            Message::system(SESSION_SYSTEM_PROMPT),
            Message::user(problem_summary(problem)),
        ];
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether a problem has been loaded into this conversation.
    pub fn is_active(&self) -> bool {
        self.messages
            .first()
            .is_some_and(|m| m.role == MessageRole::System)
    }

    /// Everything after the seed messages: the guidance and the follow-up
    /// exchange shown in the chat history.
    pub fn follow_ups(&self) -> &[Message] {
        self.messages.get(SEED_LEN..).unwrap_or(&[])
    }
}

/// The opening user message for a problem.
pub fn problem_summary(problem: &ProblemData) -> String {
    format!(
        "Help me understand this problem: {}.\nProblem Statement: {}\nExamples: {}\nConstraints: {}",
        problem.title, problem.problem_statement, problem.examples, problem.constraints
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(title: &str) -> ProblemData {
        ProblemData {
            title: title.into(),
            problem_statement: "<p>Find two numbers.</p>".into(),
            examples: "[2,7,11,15]\n9".into(),
            constraints: "{}".into(),
        }
    }

    #[test]
    fn new_conversation_is_inactive() {
        let convo = Conversation::new();
        assert!(convo.is_empty());
        assert!(!convo.is_active());
        assert!(convo.follow_ups().is_empty());
    }

    #[test]
    fn reset_seeds_system_then_problem() {
        let mut convo = Conversation::new();
        convo.reset(&problem("Two Sum"));

        let msgs = convo.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0], Message::system(SESSION_SYSTEM_PROMPT));
        assert_eq!(msgs[1].role, MessageRole::User);
        assert!(msgs[1].content.contains("Two Sum"));
        assert!(msgs[1].content.contains("Find two numbers."));
        assert!(convo.is_active());
    }

    #[test]
    fn appends_keep_order() {
        let mut convo = Conversation::new();
        convo.reset(&problem("Two Sum"));
        convo.append_assistant("guidance");
        convo.append_user("why?");
        convo.append_assistant("because");

        let roles: Vec<MessageRole> = convo.follow_ups().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(convo.len(), 5);
    }

    #[test]
    fn reset_discards_previous_problem() {
        let mut convo = Conversation::new();
        convo.reset(&problem("Two Sum"));
        convo.append_assistant("guidance");
        convo.append_user("more");

        convo.reset(&problem("LRU Cache"));
        assert_eq!(convo.len(), 2);
        assert!(convo.messages()[1].content.contains("LRU Cache"));
        assert!(!convo.messages()[1].content.contains("Two Sum"));
    }

    #[test]
    fn summary_lists_every_field() {
        let text = problem_summary(&problem("Two Sum"));
        assert!(text.starts_with("Help me understand this problem: Two Sum."));
        assert!(text.contains("\nExamples: [2,7,11,15]\n9"));
        assert!(text.ends_with("Constraints: {}"));
    }
}
