//! Health / heartbeat endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// OpenAPI fragment for the heartbeat, merged by [`crate::routes::doc`].
pub(super) fn api_docs() -> utoipa::openapi::OpenApi {
    HealthApi::openapi()
}

/// Heartbeat endpoint.
///
/// Reports the server version plus the copilot's configuration surface:
/// which knowledge profile is active, how many documents it serves, and
/// whether the request-audit store is attached.  Monitoring polls this.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let profile = state.config.knowledge_profile;
    Json(health_body(
        profile.name(),
        profile.documents().len(),
        state.store.is_some(),
    ))
}

fn health_body(profile: &str, documents: usize, audit_store: bool) -> Value {
    json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "knowledgeProfile": profile,
        "documents": documents,
        "auditStore": audit_store,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
