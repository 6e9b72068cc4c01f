//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! The client body is always assistant-voiced:
//! `{ "message": "...", "error": true }`, plus `"limitReached": true` for
//! the quota / context-exhaustion class.  Provider and database internals
//! are logged with full detail but never leak to the visitor.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use copilot_core::ProviderError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller exceeded the local fixed-window quota.
    #[error("rate limited")]
    RateLimited,

    /// The provider rejected the call under its own rate limit or because
    /// the conversation no longer fits its context.
    #[error("provider limit reached: {0}")]
    LimitReached(String),

    /// The provider failed in a way the visitor cannot fix.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map a provider failure to the visitor-facing taxonomy.
    pub fn from_provider(e: ProviderError) -> Self {
        if e.is_limit() {
            error!(error = %e, "provider limit reached");
            Self::LimitReached(
                "I'm receiving a lot of questions right now and had to pause this \
                 conversation. Please refresh the page to start a new one."
                    .to_owned(),
            )
        } else {
            error!(error = %e, "provider call failed");
            Self::Upstream(
                "I'm having trouble connecting right now. Please try again in a \
                 moment, or explore the stakeholder sections to learn more about VSDP."
                    .to_owned(),
            )
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, limit_reached) = match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m, false),
            ServerError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "You've sent a lot of messages! Please wait a moment before asking \
                 another question."
                    .to_owned(),
                false,
            ),
            ServerError::LimitReached(m) => (StatusCode::TOO_MANY_REQUESTS, m, true),
            ServerError::Upstream(m) => (StatusCode::BAD_GATEWAY, m, false),
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    generic_apology(),
                    false,
                )
            }
        };

        let mut body = json!({ "message": message, "error": true });
        if limit_reached {
            body["limitReached"] = json!(true);
        }
        (status, Json(body)).into_response()
    }
}

fn generic_apology() -> String {
    "Something went wrong on my end. Please try again in a moment.".to_owned()
}

/// JSON body extractor whose rejection goes through [`ServerError`], so a
/// malformed body or an unknown enum label gets the same
/// `{ "message": …, "error": true }` shape as every other failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
