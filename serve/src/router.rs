//! Axum router: routes plus the CORS allow-list (spec §6's `APP_CORS_ORIGINS`).

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{chat, health, sessions};
use crate::state::AppState;

/// Builds the CORS layer from a comma-separated origin allow-list. An empty or absent list
/// permits no cross-origin requests at all rather than falling back to `Any` — the spec's
/// allow-list wording implies an explicit opt-in, not a wildcard default.
pub fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/sessions", get(sessions::list_sessions))
        .route(
            "/api/sessions/cleanup",
            post(sessions::cleanup_sessions),
        )
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .layer(cors)
        .with_state(state)
}
