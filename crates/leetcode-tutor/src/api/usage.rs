//! Session correlation ids and token/cost accounting.
//!
//! Each tutoring session gets a `trace_id` that prefixes its log lines.
//! Every assistant reply's token usage is folded into a [`CostTracker`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::UsageInfo;

/// Generate a unique trace ID for a tutoring session.
pub fn generate_trace_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // Counter disambiguates ids created within the same clock tick.
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("ses-{ts:x}-{count:04x}")
}

/// Per-model pricing for cost estimation (USD per 1M tokens).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPricing {
    /// Price per 1M input tokens.
    pub input_per_million: f64,
    /// Price per 1M output tokens.
    pub output_per_million: f64,
}

impl ModelPricing {
    /// Estimate cost for given token counts.
    pub fn estimate_cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (prompt_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (completion_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self {
            input_per_million: 2.50,
            output_per_million: 10.0,
        }
    }
}

/// Lookup approximate pricing for a model by name.
///
/// Order matters: `gpt-4o-mini` must be checked before `gpt-4o`, which must
/// be checked before plain `gpt-4`.
pub fn pricing_for_model(model: &str) -> ModelPricing {
    let name = model.rsplit('/').next().unwrap_or(model).to_lowercase();

    let (input, output) = if name.contains("4o-mini") {
        (0.15, 0.60)
    } else if name.contains("gpt-4o") {
        (2.50, 10.0)
    } else if name.contains("gpt-4-turbo") {
        (10.0, 30.0)
    } else if name.contains("gpt-4.1-mini") {
        (0.40, 1.60)
    } else if name.contains("gpt-4.1") {
        (2.0, 8.0)
    } else if name.contains("gpt-4") {
        (30.0, 60.0)
    } else if name.contains("gpt-3.5") {
        (0.50, 1.50)
    } else if name.starts_with("o1") || name.starts_with("o3") {
        (15.0, 60.0)
    } else {
        return ModelPricing::default();
    };

    ModelPricing {
        input_per_million: input,
        output_per_million: output,
    }
}

/// Cumulative token and cost tracker for one session.
#[derive(Debug, Default)]
pub struct CostTracker {
    pub replies: u32,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub estimated_cost_usd: f64,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one reply. Replies without usage still count toward `replies`.
    pub fn record(&mut self, usage: Option<&UsageInfo>, pricing: &ModelPricing) {
        self.replies += 1;
        let Some(usage) = usage else {
            return;
        };
        let prompt = usage.prompt_tokens.unwrap_or(0);
        let completion = usage.completion_tokens.unwrap_or(0);
        self.total_prompt_tokens += prompt as u64;
        self.total_completion_tokens += completion as u64;
        self.estimated_cost_usd += pricing.estimate_cost(prompt, completion);
    }

    /// Total tokens consumed.
    pub fn total_tokens(&self) -> u64 {
        self.total_prompt_tokens + self.total_completion_tokens
    }

    /// Format as a short summary string.
    pub fn summary(&self) -> String {
        format!(
            "replies: {}, tokens: {} prompt + {} completion = {} total, est. cost: ${:.4}",
            self.replies,
            self.total_prompt_tokens,
            self.total_completion_tokens,
            self.total_tokens(),
            self.estimated_cost_usd,
        )
    }
}
