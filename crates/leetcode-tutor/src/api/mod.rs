//! Cross-cutting plumbing for the two outbound calls.
//!
//! - [`retry`]: transient error detection (429, 5xx, timeouts) with
//!   configurable exponential backoff and jitter. Off by default.
//! - [`usage`]: per-session trace ids, per-model pricing tables, and the
//!   cumulative [`CostTracker`] behind the shell's `/usage` command.

pub mod retry;
pub mod usage;

pub use retry::{RetryConfig, Retryable, with_retry};
pub use usage::{CostTracker, ModelPricing, generate_trace_id, pricing_for_model};
