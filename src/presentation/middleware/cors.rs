use crate::config::Config;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};

/// CORS from `CORS_ALLOWED_ORIGINS`. Unset or `*` allows any origin without
/// credentials; an explicit list allows credentials so the refresh cookie flows.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let configured = config.cors_origins();

    if configured.is_empty() || configured.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin: {}", e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
