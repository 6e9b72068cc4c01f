//! Router-level tests: the full Axum application driven through
//! `tower::ServiceExt::oneshot` with a stub provider injected via
//! [`AppState`], so no network or API key is involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use copilot_core::{
    provider::TextStream, CompletionProvider, CompletionRequest, CorpusCache, FixedWindowLimiter,
    KnowledgeProfile, ProviderError,
};
use futures::stream;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::config::Config;
use crate::routes;
use crate::state::AppState;

// ── Stub provider ─────────────────────────────────────────────────────────────

enum StubBehavior {
    /// Deliver these chunks; `complete` returns their concatenation.
    Chunks(Vec<&'static str>),
    /// `stream` fails before any chunk is produced.
    FailOnOpen,
    /// The stream opens but its first unit is a provider limit error.
    FailFirstChunk,
    /// One chunk arrives, then the stream errors.
    FailMidStream,
}

struct StubProvider {
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubProvider {
    fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self { behavior, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, _req: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Chunks(chunks) => Ok(chunks.concat()),
            _ => Err(ProviderError::Api { status: 500, message: "stub".into() }),
        }
    }

    async fn stream(&self, _req: &CompletionRequest) -> Result<TextStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Chunks(chunks) => {
                let items: Vec<Result<String, ProviderError>> =
                    chunks.iter().map(|c| Ok((*c).to_owned())).collect();
                Ok(Box::pin(stream::iter(items)))
            }
            StubBehavior::FailOnOpen => {
                Err(ProviderError::RateLimited("provider throttled".into()))
            }
            StubBehavior::FailFirstChunk => {
                let items: Vec<Result<String, ProviderError>> =
                    vec![Err(ProviderError::ContextTooLong("prompt is too long".into()))];
                Ok(Box::pin(stream::iter(items)))
            }
            StubBehavior::FailMidStream => {
                let items: Vec<Result<String, ProviderError>> = vec![
                    Ok("partial ".to_owned()),
                    Err(ProviderError::Stream("connection reset".into())),
                ];
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    app: Router,
    provider: Arc<StubProvider>,
    // Holds the knowledge directory alive for the test's duration.
    _knowledge_dir: tempfile::TempDir,
}

fn harness(behavior: StubBehavior) -> Harness {
    let knowledge_dir = tempfile::tempdir().unwrap();
    std::fs::write(knowledge_dir.path().join("VSDP.md"), "test corpus body").unwrap();

    let config = Config {
        bind_address: "127.0.0.1:0".into(),
        anthropic_api_key: "test-key".into(),
        model: "claude-sonnet-4-5".into(),
        max_tokens: 1024,
        knowledge_dir: knowledge_dir.path().to_string_lossy().into_owned(),
        knowledge_profile: KnowledgeProfile::Executive,
        database_url: None,
        log_level: "info".into(),
        log_json: false,
        cors_allowed_origins: None,
        enable_swagger: false,
    };

    let provider = StubProvider::new(behavior);
    let state = Arc::new(AppState {
        config: Arc::new(config),
        corpus: CorpusCache::new(),
        limiter: FixedWindowLimiter::new(),
        provider: provider.clone(),
        store: None,
    });

    Harness { app: routes::build(state), provider, _knowledge_dir: knowledge_dir }
}

fn chat_request(body: &str, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_messages_rejected_without_provider_call() {
    let h = harness(StubBehavior::Chunks(vec!["never"]));

    for body in [r#"{"messages":[]}"#, r#"{}"#] {
        let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = json_body(resp).await;
        assert_eq!(json["error"], true);
    }
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn eleventh_request_from_one_address_is_throttled() {
    let h = harness(StubBehavior::Chunks(vec!["ok"]));
    let body = r#"{"messages":[{"role":"user","content":"hi"}],"stream":false}"#;

    for i in 0..10 {
        let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.2")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "request {}", i + 1);
    }

    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(resp).await;
    assert_eq!(json["error"], true);
    assert!(json.get("limitReached").is_none());

    // A different address is unaffected.
    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.3")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Only the accepted requests reached the provider.
    assert_eq!(h.provider.calls(), 11);
}

#[tokio::test]
async fn non_streaming_reply_is_json_message() {
    let h = harness(StubBehavior::Chunks(vec!["Hello, ", "visitor"]));
    let body = r#"{"messages":[{"role":"user","content":"hi"}],"stream":false}"#;

    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.4")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["message"], "Hello, visitor");
}

#[tokio::test]
async fn streamed_reply_matches_non_streaming_byte_for_byte() {
    let h = harness(StubBehavior::Chunks(vec!["Hel", "lo, ", "visitor"]));

    let streamed = r#"{"messages":[{"role":"user","content":"hi"}],"stream":true}"#;
    let resp = h.app.clone().oneshot(chat_request(streamed, "198.51.100.5")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");
    let streamed_bytes = resp.into_body().collect().await.unwrap().to_bytes();

    let whole = r#"{"messages":[{"role":"user","content":"hi"}],"stream":false}"#;
    let resp = h.app.clone().oneshot(chat_request(whole, "198.51.100.6")).await.unwrap();
    let json = json_body(resp).await;

    assert_eq!(streamed_bytes, json["message"].as_str().unwrap().as_bytes());
}

#[tokio::test]
async fn provider_throttle_on_open_returns_structured_limit_error() {
    let h = harness(StubBehavior::FailOnOpen);
    let body = r#"{"messages":[{"role":"user","content":"hi"}]}"#;

    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.7")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(resp).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["limitReached"], true);
}

#[tokio::test]
async fn first_chunk_failure_becomes_json_error_not_broken_stream() {
    let h = harness(StubBehavior::FailFirstChunk);
    let body = r#"{"messages":[{"role":"user","content":"hi"}]}"#;

    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.8")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = json_body(resp).await;
    assert_eq!(json["limitReached"], true);
    assert!(json["message"].as_str().unwrap().contains("refresh"));
}

#[tokio::test]
async fn mid_stream_failure_truncates_the_body() {
    let h = harness(StubBehavior::FailMidStream);
    let body = r#"{"messages":[{"role":"user","content":"hi"}]}"#;

    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.9")).await.unwrap();
    // Headers were committed before the failure.
    assert_eq!(resp.status(), StatusCode::OK);

    let mut body = resp.into_body();
    let first = body.frame().await.unwrap().unwrap();
    assert_eq!(first.into_data().unwrap(), "partial ".as_bytes());

    // The next poll surfaces the abnormal termination.
    assert!(body.frame().await.unwrap().is_err());
}

#[tokio::test]
async fn unknown_section_label_is_rejected() {
    let h = harness(StubBehavior::Chunks(vec!["ok"]));
    let body = r#"{"messages":[{"role":"user","content":"hi"}],"currentSection":"investors"}"#;

    let resp = h.app.clone().oneshot(chat_request(body, "198.51.100.10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["error"], true);
    assert!(json["message"].is_string());
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn malformed_body_gets_the_structured_error_shape() {
    let h = harness(StubBehavior::Chunks(vec!["ok"]));

    let resp = h
        .app
        .clone()
        .oneshot(chat_request("{not json", "198.51.100.11"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["error"], true);
    assert!(json["message"].is_string());
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let h = harness(StubBehavior::Chunks(vec![]));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["knowledgeProfile"], "executive");
    assert_eq!(json["auditStore"], false);
}

#[tokio::test]
async fn responses_carry_a_trace_id() {
    let h = harness(StubBehavior::Chunks(vec![]));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert!(resp.headers().contains_key("x-trace-id"));
}
