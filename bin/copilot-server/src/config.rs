//! Server configuration, loaded from environment variables at startup.

use copilot_core::KnowledgeProfile;

/// Runtime configuration for copilot-server.
///
/// Every field except the provider API key has a sensible default so the
/// server works out-of-the-box without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Anthropic API key.  Empty is allowed at startup (useful for local
    /// work against a stub); real calls will then fail with an auth error.
    pub anthropic_api_key: String,

    /// Model identifier passed to the provider.
    pub model: String,

    /// Output-length cap per completion.
    pub max_tokens: u32,

    /// Directory holding the knowledge documents.
    pub knowledge_dir: String,

    /// Which document catalog / audience preamble to serve.
    pub knowledge_profile: KnowledgeProfile,

    /// SQLite database URL for the request-audit store.  `None` disables
    /// the store entirely; nothing in the chat flow depends on it.
    pub database_url: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allow-list; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui` (disable in production).
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("COPILOT_BIND", "0.0.0.0:3000"),
            anthropic_api_key: env_or("ANTHROPIC_API_KEY", ""),
            model: env_or("COPILOT_MODEL", "claude-sonnet-4-5"),
            max_tokens: parse_env("COPILOT_MAX_TOKENS", 1024),
            knowledge_dir: env_or("COPILOT_KNOWLEDGE_DIR", "knowledge"),
            knowledge_profile: std::env::var("COPILOT_PROFILE")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(p) => Some(p),
                    Err(e) => {
                        eprintln!("WARN: {e}; falling back to the executive profile");
                        None
                    }
                })
                .unwrap_or_default(),
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            log_level: env_or("COPILOT_LOG", "info"),
            log_json: env_flag("COPILOT_LOG_JSON", false),
            cors_allowed_origins: std::env::var("COPILOT_CORS_ORIGINS").ok(),
            enable_swagger: env_flag("COPILOT_ENABLE_SWAGGER", true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
