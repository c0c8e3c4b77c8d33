//! Convenience re-exports for common `leetcode-tutor` types.
//!
//! ```ignore
//! use leetcode_tutor::prelude::*;
//! ```

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{AssistantError, ChatClient, ChatRequest, Message, MessageRole, UsageInfo};

// ── Components ──────────────────────────────────────────────────────
pub use crate::assistant::{Assistant, Reply, TUTOR_SYSTEM_PROMPT, TutorAssistant};
pub use crate::config::TutorConfig;
pub use crate::conversation::Conversation;
pub use crate::format::{format_response, html_to_text};
pub use crate::problem::{FetchError, ProblemData, ProblemFetcher, ProblemSource, extract_title_slug};
pub use crate::session::{LoadedProblem, Session, Tutor, TutorError};
pub use crate::shell::ShellCommand;

// ── Plumbing ────────────────────────────────────────────────────────
pub use crate::api::{CostTracker, RetryConfig};
