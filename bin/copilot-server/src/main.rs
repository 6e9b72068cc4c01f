//! copilot-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Open the optional SQLite audit store and run pending migrations.
//! 4. Construct the Anthropic provider and the shared application state.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod db;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;
#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use copilot_core::provider::anthropic::AnthropicProvider;
use copilot_core::{CorpusCache, FixedWindowLimiter};
use tracing::{info, warn};

use crate::config::Config;
use crate::db::sqlite::SqliteStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: COPILOT_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "copilot-server starting");

    if cfg.anthropic_api_key.is_empty() {
        warn!("ANTHROPIC_API_KEY is not set; provider calls will fail until it is");
    }

    // ── 3. Optional audit store ────────────────────────────────────────────────
    // Nothing in the chat flow depends on the store; it only records
    // request/response audit rows when configured.
    let store = match &cfg.database_url {
        Some(url) => {
            let store = SqliteStore::connect(url).await?;
            info!(database_url = %url, "request-audit store ready");
            Some(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set; request auditing disabled");
            None
        }
    };

    // ── 4. Provider + shared application state ─────────────────────────────────
    let provider = AnthropicProvider::new(cfg.anthropic_api_key.clone(), cfg.model.clone());

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        corpus: CorpusCache::new(),
        limiter: FixedWindowLimiter::new(),
        provider: Arc::new(provider),
        store,
    });

    // Load the corpus eagerly so a missing knowledge directory shows up in
    // the logs at startup rather than on the first chat request.
    let _ = state.corpus();

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("copilot-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
