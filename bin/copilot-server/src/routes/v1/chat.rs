//! The copilot chat endpoint.
//!
//! Per-request state machine: validate the conversation, apply the local
//! rate limit, assemble the system prompt from the cached corpus, call the
//! hosted provider once, then deliver the reply either as one JSON body or
//! as a streamed plain-text body.
//!
//! Streaming commits only after the first provider chunk has been probed
//! successfully, so provider-side rate-limit and context-length failures
//! still reach the client as structured JSON.  Failures after the stream
//! has begun can only terminate the connection; the headers are gone.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use tracing::{debug, error};
use utoipa::OpenApi;

use copilot_core::prompt::build_system_prompt;
use copilot_core::provider::ProbedStream;
use copilot_core::CompletionRequest;

use crate::error::{AppJson, ServerError};
use crate::schemas::v1::chat::{ChatReply, ChatRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(
    ChatRequest,
    ChatReply,
    copilot_core::ChatTurn,
    copilot_core::StakeholderSection
)))]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Copilot chat (`POST /v1/chat`).
///
/// With `stream: true` (the default) the reply arrives as incremental
/// plain text; otherwise as a single `{ "message": … }` JSON body.
#[utoipa::path(
    post,
    path = "/v1/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply generated (JSON or plain-text stream)", body = ChatReply),
        (status = 400, description = "Empty conversation"),
        (status = 429, description = "Rate limited, locally or by the provider"),
        (status = 502, description = "Provider failure"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Response, ServerError> {
    if req.messages.is_empty() {
        return Err(ServerError::BadRequest("No messages provided".into()));
    }

    let client = client_key(&headers);
    if state.limiter.check(&client).is_limited() {
        return Err(ServerError::RateLimited);
    }

    let corpus = state.corpus();
    let system = build_system_prompt(&corpus, req.current_section);

    debug!(
        client = %client,
        turns = req.messages.len(),
        section = ?req.current_section,
        stream = req.stream,
        "chat request"
    );

    let completion = CompletionRequest {
        system,
        messages: req.messages,
        max_tokens: state.config.max_tokens,
    };

    if !req.stream {
        let message = state
            .provider
            .complete(&completion)
            .await
            .map_err(ServerError::from_provider)?;
        return Ok(Json(ChatReply { message }).into_response());
    }

    let stream = state
        .provider
        .stream(&completion)
        .await
        .map_err(ServerError::from_provider)?;

    // Probe the first chunk before committing response headers; an early
    // provider failure becomes a structured error instead of a broken
    // stream.
    let probed = ProbedStream::probe(stream)
        .await
        .map_err(ServerError::from_provider)?;

    let body_stream = probed.into_stream().map(|chunk| match chunk {
        Ok(text) => Ok(bytes::Bytes::from(text)),
        Err(e) => {
            // Headers are already committed; all we can do is cut the
            // connection so the client sees a truncated body.
            error!(error = %e, "provider failed mid-stream; terminating response");
            Err(std::io::Error::other(e.to_string()))
        }
    });

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Body::from_stream(body_stream))
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(response)
}

/// Client identity for rate limiting: the first `X-Forwarded-For` entry, or
/// `"unknown"` when the platform did not supply one.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_owned())
}
