//! CORS layer for the widget origin.
//!
//! The chat widget is served from the marketing site, so production deploys
//! set `COPILOT_CORS_ORIGINS` to that site's origin(s).  Without it the
//! layer is wildcard, which suits local development and previews.

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

pub fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_headers(Any).allow_methods(Any);

    match config.cors_allowed_origins.as_deref().map(parse_origins) {
        Some(origins) if !origins.is_empty() => {
            layer.allow_origin(AllowOrigin::list(origins))
        }
        // Unset, or set to nothing parseable.
        _ => layer.allow_origin(Any),
    }
}

fn parse_origins(list: &str) -> Vec<HeaderValue> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_comma_separated_origins() {
        let origins = parse_origins("https://visionsource.com, https://www.visionsource.com");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://visionsource.com");
    }

    #[test]
    fn blank_entries_are_dropped() {
        assert!(parse_origins("  ,  ").is_empty());
    }
}
