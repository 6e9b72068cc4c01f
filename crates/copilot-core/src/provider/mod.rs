//! Completion-provider abstraction.
//!
//! [`CompletionProvider`] is the seam between the chat endpoint and the
//! hosted language-model service: one whole-reply call and one streaming
//! call, a single attempt each, no retries.  The server injects the concrete
//! [`anthropic::AnthropicProvider`]; tests inject stubs.
//!
//! Streaming follows an explicit two-phase protocol: [`ProbedStream::probe`]
//! consumes the first unit of provider output before any response headers
//! are committed, so provider-side rate-limit and context-length failures
//! can still be delivered as structured errors.

pub mod anthropic;
pub mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Author of a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single immutable turn in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// One outbound completion call: system instructions, ordered history and an
/// output-length cap.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatTurn>,
    pub max_tokens: u32,
}

/// Failures surfaced by a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the call under its own rate limit or overload.
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// The conversation plus corpus exceeded the provider's context size.
    #[error("context length exceeded: {0}")]
    ContextTooLong(String),

    /// Any other structured API error.
    #[error("provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before or during the call.
    #[error("provider transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The stream delivered something unparseable.
    #[error("provider stream error: {0}")]
    Stream(String),
}

impl ProviderError {
    /// True for the quota / context-exhaustion class that the client should
    /// treat as "this conversation cannot continue as-is".
    pub fn is_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::ContextTooLong(_))
    }
}

/// Incremental text deltas from a streaming completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Hosted chat-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run the completion to the end and return the whole reply.
    async fn complete(&self, req: &CompletionRequest) -> Result<String, ProviderError>;

    /// Open a streaming completion delivering text deltas as they arrive.
    async fn stream(&self, req: &CompletionRequest) -> Result<TextStream, ProviderError>;
}

/// A stream whose first unit has already been consumed successfully.
///
/// `probe` pulls one item: an error there aborts before anything is written
/// to the client, while success hands back a stream that replays the probed
/// unit followed by the remainder, byte-identical to the original.
pub struct ProbedStream {
    first: Option<String>,
    rest: TextStream,
}

impl std::fmt::Debug for ProbedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbedStream")
            .field("first", &self.first)
            .finish_non_exhaustive()
    }
}

impl ProbedStream {
    /// Attempt the first unit of `stream`.
    pub async fn probe(mut stream: TextStream) -> Result<Self, ProviderError> {
        match stream.next().await {
            Some(Ok(first)) => Ok(Self { first: Some(first), rest: stream }),
            Some(Err(e)) => Err(e),
            // An immediately finished stream commits to an empty body.
            None => Ok(Self { first: None, rest: stream }),
        }
    }

    /// Replay the probed unit followed by the rest of the stream.
    pub fn into_stream(self) -> TextStream {
        let replay = futures::stream::iter(self.first.map(Ok));
        Box::pin(replay.chain(self.rest))
    }
}
