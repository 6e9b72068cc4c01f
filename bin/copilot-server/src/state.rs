//! Shared application state injected into every Axum handler.

use std::path::PathBuf;
use std::sync::Arc;

use copilot_core::{CompletionProvider, CorpusCache, FixedWindowLimiter};

use crate::config::Config;
use crate::db::sqlite::SqliteStore;

/// State shared across all HTTP handlers.
///
/// The corpus cache and rate-limit table are the only process-wide mutable
/// pieces; both live here rather than in module-level statics so tests can
/// build a fresh state with fakes and a controllable clock.
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Once-per-process knowledge corpus cache.
    pub corpus: CorpusCache,
    /// Per-client fixed-window request counter.
    pub limiter: FixedWindowLimiter,
    /// Hosted completion provider (Anthropic in production, stubs in tests).
    pub provider: Arc<dyn CompletionProvider>,
    /// Optional request-audit store; `None` when `DATABASE_URL` is unset.
    pub store: Option<Arc<SqliteStore>>,
}

impl AppState {
    /// Return the cached corpus, loading from disk on first use.
    pub fn corpus(&self) -> Arc<str> {
        self.corpus.get_or_load(
            &PathBuf::from(&self.config.knowledge_dir),
            self.config.knowledge_profile,
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}
