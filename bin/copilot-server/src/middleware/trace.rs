//! Per-request trace-ID injection and latency logging.
//!
//! Each request gets an `x-trace-id` (taken from the caller when valid,
//! generated otherwise) that tags the tracing span and the response header.
//! Bodies are never buffered here: the chat endpoint streams its response
//! and must pass through untouched.
//!
//! When a request-audit store is configured, a row is inserted on arrival
//! and updated with status/latency after the response headers are written.
//! Store failures are logged and ignored; auditing never blocks serving.

use crate::db::{RequestRecord, RequestStore};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

pub async fn trace_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("request started");

        if let Some(store) = &state.store {
            let record = RequestRecord {
                id: trace_id,
                method: method.to_string(),
                path: path.clone(),
                status: None,
                latency_ms: None,
                created_at: chrono::Utc::now(),
            };
            if let Err(e) = store.insert(record).await {
                warn!(error = %e, "failed to insert request audit row");
            }
        }

        if let Ok(value) = trace_id.to_string().parse() {
            req.headers_mut().insert(X_TRACE_ID, value);
        }

        let mut response = next.run(req).await;

        let latency = start_time.elapsed();
        let status = response.status().as_u16();

        if let Ok(value) = trace_id.to_string().parse() {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        if let Some(store) = &state.store {
            let latency_ms = i64::try_from(latency.as_millis()).unwrap_or(i64::MAX);
            if let Err(e) = store
                .update_response(trace_id, i64::from(status), latency_ms)
                .await
            {
                warn!(error = %e, "failed to update request audit row");
            }
        }

        info!(status, latency_ms = latency.as_millis() as u64, "response finished");

        response
    }
    .instrument(span)
    .await
}
