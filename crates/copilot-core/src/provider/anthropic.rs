//! Anthropic Messages API client.
//!
//! One outbound call per client request, no retries.  Streaming uses the
//! SSE wire format; only `text_delta` payloads become output units, and an
//! in-band `error` event terminates the stream with a typed failure.

use std::collections::VecDeque;

use futures::stream::{unfold, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sse::SseLineBuffer;
use super::{ChatTurn, CompletionProvider, CompletionRequest, ProviderError, TextStream};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Point the client at a different host; used by tests against a local
    /// stand-in server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send(
        &self,
        req: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = MessagesBody {
            model: &self.model,
            max_tokens: req.max_tokens,
            system: &req.system,
            messages: &req.messages,
            stream,
        };

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp
            .json::<ApiErrorEnvelope>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.to_string());
        Err(classify_error(status.as_u16(), message))
    }
}

#[async_trait::async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, req: &CompletionRequest) -> Result<String, ProviderError> {
        let resp = self.send(req, false).await?;
        let body: MessagesResponse = resp.json().await?;

        let text: String = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();
        debug!(model = %self.model, output_len = text.len(), "completion finished");
        Ok(text)
    }

    async fn stream(&self, req: &CompletionRequest) -> Result<TextStream, ProviderError> {
        let resp = self.send(req, true).await?;
        let inner = resp.bytes_stream();

        let state = StreamState {
            inner: Box::pin(inner),
            buf: SseLineBuffer::new(),
            pending: VecDeque::new(),
            done: false,
        };

        let stream = unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.pending.pop_front() {
                    return Some((item, state));
                }
                if state.done {
                    return None;
                }
                match state.inner.next().await {
                    None => state.done = true,
                    Some(Err(e)) => {
                        state.done = true;
                        state.pending.push_back(Err(ProviderError::Http(e)));
                    }
                    Some(Ok(bytes)) => {
                        for data in state.buf.feed(&bytes) {
                            match serde_json::from_str::<StreamEvent>(&data.0) {
                                Ok(StreamEvent::ContentBlockDelta {
                                    delta: Delta::TextDelta { text },
                                }) => state.pending.push_back(Ok(text)),
                                Ok(StreamEvent::MessageStop) => state.done = true,
                                Ok(StreamEvent::Error { error }) => {
                                    state.done = true;
                                    state
                                        .pending
                                        .push_back(Err(classify_stream_error(&error)));
                                }
                                // Ping, message_start, content_block_start …
                                Ok(_) => {}
                                Err(e) => {
                                    state.done = true;
                                    state.pending.push_back(Err(ProviderError::Stream(
                                        format!("unparseable event: {e}"),
                                    )));
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

type BytesStream =
    std::pin::Pin<Box<dyn futures::Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>;

struct StreamState {
    inner: BytesStream,
    buf: SseLineBuffer,
    pending: VecDeque<Result<String, ProviderError>>,
    done: bool,
}

fn classify_error(status: u16, message: String) -> ProviderError {
    match status {
        // 529 is Anthropic's "overloaded" status; treat like throttling.
        429 | 529 => ProviderError::RateLimited(message),
        400 if message.contains("too long") || message.contains("maximum context") => {
            ProviderError::ContextTooLong(message)
        }
        _ => ProviderError::Api { status, message },
    }
}

fn classify_stream_error(error: &ApiErrorBody) -> ProviderError {
    match error.kind.as_str() {
        "overloaded_error" | "rate_limit_error" => {
            ProviderError::RateLimited(error.message.clone())
        }
        _ => ProviderError::Stream(error.message.clone()),
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum StreamEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(rename = "error")]
    Error { error: ApiErrorBody },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Delta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}
