//! Problem fetching: slug extraction, the GraphQL query, and statement cleanup.
//!
//! A problem URL such as `https://leetcode.com/problems/two-sum/description/`
//! is reduced to its slug (`two-sum`), which is sent as the `titleSlug`
//! variable of a single GraphQL POST. The returned HTML statement is cleaned
//! of the "Follow up" note and any trailing examples/constraints boilerplate
//! before it reaches the conversation.

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::retry::{RetryConfig, Retryable, is_transient_status, with_retry};
use crate::{BROWSER_USER_AGENT, DEFAULT_TIMEOUT, LEETCODE_GRAPHQL_URL};

const QUESTION_QUERY: &str = r#"
query getQuestionDetail($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        title
        content
        exampleTestcases
        metaData
    }
}
"#;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://leetcode\.com/problems/([^/?#\s]+)/?").expect("slug pattern compiles")
});

static FOLLOW_UP_PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<p>(?:\s|&nbsp;|<strong>|<b>)*Follow[- ]up:?.*?</p>")
        .expect("follow-up paragraph pattern compiles")
});

// Stops at the enclosing element's closing tag, which is kept.
static FOLLOW_UP_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:<strong>|<b>)?\s*Follow[- ]up:.*?(</p>|</div>|</li>|\z)")
        .expect("follow-up tail pattern compiles")
});

static EXAMPLES_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Examples:.*?Constraints:.*").expect("examples tail pattern compiles")
});

// ── Data ───────────────────────────────────────────────────────────

/// A fetched problem. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemData {
    pub title: String,
    /// HTML-bearing statement with the follow-up note removed.
    pub problem_statement: String,
    /// Raw example test-case inputs, one value per line.
    pub examples: String,
    /// The problem's `metaData` JSON (function signature and parameter types).
    pub constraints: String,
}

// ── Errors ─────────────────────────────────────────────────────────

/// Failures fetching a problem.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid LeetCode problem URL")]
    InvalidUrl,
    #[error("Failed to fetch problem: {status}")]
    Http { status: u16 },
    #[error("no problem found for '{slug}'")]
    NotFound { slug: String },
    #[error("LeetCode GraphQL error: {0}")]
    GraphQl(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to parse problem response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl Retryable for FetchError {
    fn is_transient(&self) -> bool {
        match self {
            FetchError::Http { status } => is_transient_status(*status),
            FetchError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// ── Pure helpers ───────────────────────────────────────────────────

/// Extract the problem slug from a LeetCode problem URL.
///
/// ```
/// use leetcode_tutor::problem::extract_title_slug;
///
/// let slug = extract_title_slug("https://leetcode.com/problems/two-sum/").unwrap();
/// assert_eq!(slug, "two-sum");
/// assert!(extract_title_slug("https://example.com/two-sum").is_err());
/// ```
pub fn extract_title_slug(url: &str) -> Result<String, FetchError> {
    SLUG_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(FetchError::InvalidUrl)
}

/// Strip the "Follow up" note and any trailing examples/constraints block.
pub fn clean_statement(html: &str) -> String {
    let without_paragraph = FOLLOW_UP_PARAGRAPH_RE.replace_all(html, "");
    let without_tail = FOLLOW_UP_TAIL_RE.replace_all(&without_paragraph, "${1}");
    let cleaned = EXAMPLES_TAIL_RE.replace(&without_tail, "");
    cleaned.trim().to_string()
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: QuestionVariables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionVariables<'a> {
    title_slug: &'a str,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse {
    data: Option<QuestionEnvelope>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
struct QuestionEnvelope {
    question: Option<RawQuestion>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    title: Option<String>,
    content: Option<String>,
    example_testcases: Option<String>,
    meta_data: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

/// Turn a status code and GraphQL response body into [`ProblemData`].
///
/// Fields the service leaves out (paid-only problems have no `content`, for
/// instance) fall back to placeholder text rather than failing the fetch.
pub fn parse_response(slug: &str, status: u16, body: &str) -> Result<ProblemData, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Http { status });
    }

    let parsed: GraphQlResponse = serde_json::from_str(body).map_err(FetchError::Decode)?;

    match parsed.data.and_then(|d| d.question) {
        Some(q) => {
            let statement = q
                .content
                .unwrap_or_else(|| "Problem description not found".to_string());
            Ok(ProblemData {
                title: q.title.unwrap_or_else(|| "Title not found".to_string()),
                problem_statement: clean_statement(&statement),
                examples: q
                    .example_testcases
                    .unwrap_or_else(|| "Examples not found".to_string()),
                constraints: q
                    .meta_data
                    .unwrap_or_else(|| "Constraints not available".to_string()),
            })
        }
        None if !parsed.errors.is_empty() => {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            Err(FetchError::GraphQl(messages.join("; ")))
        }
        None => Err(FetchError::NotFound {
            slug: slug.to_string(),
        }),
    }
}

// ── Source trait ───────────────────────────────────────────────────

/// Boxed future returned by [`ProblemSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<ProblemData, FetchError>> + Send + 'a>>;

/// Anything that can turn a slug into a problem.
pub trait ProblemSource: Send + Sync {
    fn fetch<'a>(&'a self, slug: &'a str) -> FetchFuture<'a>;
}

// ── Fetcher ────────────────────────────────────────────────────────

/// GraphQL client for LeetCode problem details.
pub struct ProblemFetcher {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
}

impl ProblemFetcher {
    /// Create a fetcher for the public LeetCode endpoint with no retries.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self::with_client(
            client,
            LEETCODE_GRAPHQL_URL,
            RetryConfig::default(),
        ))
    }

    /// Create a fetcher around an existing `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            retry,
        }
    }

    /// Extract the slug from `url` and fetch that problem.
    pub async fn fetch_url(&self, url: &str) -> Result<ProblemData, FetchError> {
        let slug = extract_title_slug(url)?;
        self.fetch_problem(&slug).await
    }

    /// Fetch a problem by slug.
    pub async fn fetch_problem(&self, slug: &str) -> Result<ProblemData, FetchError> {
        with_retry(&self.retry, "problem fetch", || self.fetch_once(slug)).await
    }

    async fn fetch_once(&self, slug: &str) -> Result<ProblemData, FetchError> {
        debug!("GraphQL request: slug={slug}, endpoint={}", self.endpoint);
        let start = Instant::now();

        let body = GraphQlRequest {
            query: QUESTION_QUERY,
            variables: QuestionVariables { title_slug: slug },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(FetchError::Transport)?;

        debug!(
            "GraphQL response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        parse_response(slug, status.as_u16(), &text)
    }
}

impl ProblemSource for ProblemFetcher {
    fn fetch<'a>(&'a self, slug: &'a str) -> FetchFuture<'a> {
        Box::pin(self.fetch_problem(slug))
    }
}
