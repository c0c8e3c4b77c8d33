//! Integration tests for the problem fetcher and chat client.
//!
//! Each test starts a one-shot HTTP responder on a random local port, points
//! the real client at it, and checks both the request that arrived and the
//! parsed result.

use leetcode_tutor::api::retry::RetryConfig;
use leetcode_tutor::assistant::{Assistant, TUTOR_SYSTEM_PROMPT, TutorAssistant};
use leetcode_tutor::problem::{FetchError, ProblemFetcher};
use leetcode_tutor::session::{Session, Tutor};
use leetcode_tutor::{AssistantError, ChatClient, Message};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as received by the responder.
struct Captured {
    head: String,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head.lines().find_map(|line| {
            line.to_ascii_lowercase()
                .starts_with(&prefix)
                .then(|| line.split_once(':').map(|(_, v)| v.trim().to_string()))
                .flatten()
        })
    }

    fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Helper: serve exactly one response, returning the base URL and a handle
/// that resolves to the captured request.
async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        captured
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let lower = l.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                let body = String::from_utf8_lossy(&buf[end + 4..end + 4 + content_length]).to_string();
                return Captured { head, body };
            }
        }
    }
    Captured {
        head: String::from_utf8_lossy(&buf).to_string(),
        body: String::new(),
    }
}

fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

const TWO_SUM: &str = r#"{"data": {"question": {
    "title": "Two Sum",
    "content": "<p>Return indices of the two numbers.</p>\n<p><strong>Follow up:</strong> Less than O(n^2)?</p>",
    "exampleTestcases": "[2,7,11,15]\n9",
    "metaData": "{\"name\": \"twoSum\"}"
}}}"#;

const CHAT_OK: &str = r#"{
    "choices": [{"message": {"role": "assistant", "content": "Intuition:\nPairs add up.\n\nExample:\n| i | nums[i] |"}, "finish_reason": "stop"}],
    "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
}"#;

// ── Problem fetcher ──────────────────────────────────────────────────

#[tokio::test]
async fn fetch_sends_graphql_query_and_cleans_statement() {
    let (base, handle) = serve_once(200, TWO_SUM).await;
    let fetcher = ProblemFetcher::with_client(local_client(), base, RetryConfig::default());

    let problem = fetcher
        .fetch_url("https://leetcode.com/problems/two-sum/")
        .await
        .unwrap();

    assert_eq!(problem.title, "Two Sum");
    assert_eq!(
        problem.problem_statement,
        "<p>Return indices of the two numbers.</p>"
    );
    assert!(!problem.problem_statement.contains("Follow up:"));
    assert_eq!(problem.examples, "[2,7,11,15]\n9");

    let request = handle.await.unwrap();
    assert!(request.head.starts_with("POST "));
    assert!(request.header("user-agent").unwrap().starts_with("Mozilla/5.0"));
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("application/json"));

    let json = request.json();
    assert_eq!(json["variables"]["titleSlug"], "two-sum");
    let query = json["query"].as_str().unwrap();
    for field in ["title", "content", "exampleTestcases", "metaData"] {
        assert!(query.contains(field), "{field}");
    }
}

#[tokio::test]
async fn fetch_surfaces_non_success_status() {
    let (base, handle) = serve_once(503, r#"{"error": "down"}"#).await;
    let fetcher = ProblemFetcher::with_client(local_client(), base, RetryConfig::default());

    let err = fetcher.fetch_problem("two-sum").await.unwrap_err();
    assert!(matches!(err, FetchError::Http { status: 503 }));
    assert_eq!(err.to_string(), "Failed to fetch problem: 503");
    handle.await.unwrap();
}

// ── Chat client ──────────────────────────────────────────────────────

#[tokio::test]
async fn assistant_prepends_tutor_prompt_and_authenticates() {
    let (base, handle) = serve_once(200, CHAT_OK).await;
    let client = ChatClient::with_client(local_client(), "sk-test", base, RetryConfig::default());
    let assistant = TutorAssistant::new(client, "gpt-4");

    let transcript = vec![Message::system("seed"), Message::user("Help me")];
    let reply = assistant.reply(&transcript).await.unwrap();
    assert!(reply.text.starts_with("Intuition:"));
    assert_eq!(reply.usage.unwrap().total_tokens, Some(150));

    let request = handle.await.unwrap();
    assert_eq!(request.header("authorization").unwrap(), "Bearer sk-test");

    let json = request.json();
    assert_eq!(json["model"], "gpt-4");
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], TUTOR_SYSTEM_PROMPT);
    assert_eq!(messages[1]["content"], "seed");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"], "Help me");
    assert!(json.get("max_tokens").is_none());
}

#[tokio::test]
async fn assistant_reports_api_errors() {
    let (base, handle) = serve_once(
        401,
        r#"{"error": {"message": "Incorrect API key provided"}}"#,
    )
    .await;
    let client = ChatClient::with_client(local_client(), "bad", base, RetryConfig::default());
    let assistant = TutorAssistant::new(client, "gpt-4");

    let err = assistant.reply(&[Message::user("hi")]).await.unwrap_err();
    match err {
        AssistantError::Http { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    handle.await.unwrap();
}

// ── End to end ───────────────────────────────────────────────────────

#[tokio::test]
async fn tutor_loads_problem_over_http() {
    let (problem_base, problem_handle) = serve_once(200, TWO_SUM).await;
    let (chat_base, chat_handle) = serve_once(200, CHAT_OK).await;

    let fetcher = ProblemFetcher::with_client(local_client(), problem_base, RetryConfig::default());
    let assistant = TutorAssistant::new(
        ChatClient::with_client(local_client(), "sk-test", chat_base, RetryConfig::default()),
        "gpt-4",
    );
    let tutor = Tutor::new(&fetcher, &assistant);
    let mut session = Session::new();

    let loaded = tutor
        .load_problem(&mut session, "https://leetcode.com/problems/two-sum/description/")
        .await
        .unwrap();

    assert_eq!(loaded.problem.title, "Two Sum");
    let intuition = loaded.guidance.find("## **Intuition**").unwrap();
    let example = loaded.guidance.find("## **Example**").unwrap();
    assert!(intuition < example);

    problem_handle.await.unwrap();
    let chat_request = chat_handle.await.unwrap().json();
    let messages = chat_request["messages"].as_array().unwrap();
    // Tutor prompt, session system message, problem summary.
    assert_eq!(messages.len(), 3);
    assert!(messages[2]["content"]
        .as_str()
        .unwrap()
        .contains("Help me understand this problem: Two Sum."));

    assert_eq!(session.conversation().len(), 3);
    assert_eq!(session.usage().total_tokens(), 150);
}
