//! Maps `AgentError` to the HTTP status codes spec'd for this transport (400/404/500).
//!
//! Most `AgentError` variants never reach here directly — a failed coordinator turn or
//! pipeline stage is absorbed into an error-shaped `CoordinatorReply`/`PipelineEvent` by
//! `intake-core` itself (spec §7's propagation policy). This mapping only applies to the
//! handful of places an error can still escape to the HTTP layer: a malformed request body,
//! an unknown session id on an admin endpoint, or an `AgentError` raised while building the
//! turn itself (before any reply has been produced).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use intake_core::AgentError;

/// Thin wrapper so `AgentError` (defined in `intake-core`, not owned by this crate) can
/// implement `IntoResponse` here.
pub struct ApiError(pub AgentError);

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AgentError::Validation(_) => StatusCode::BAD_REQUEST,
            AgentError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed with an internal error");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// A bare `400` for a request body that failed to deserialize at all.
pub fn bad_request(detail: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": detail.to_string() })),
    )
        .into_response()
}

/// A bare `404` for an admin-endpoint lookup that found nothing.
pub fn not_found(session_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("session not found: {session_id}") })),
    )
        .into_response()
}
