//! Session admin endpoints: `GET /api/sessions`, `GET /api/sessions/{id}`,
//! `DELETE /api/sessions/{id}`, `POST /api/sessions/cleanup`.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{bad_request, not_found};
use crate::state::AppState;

#[derive(Serialize)]
struct SessionListResponse {
    sessions: Vec<intake_core::model::ConversationSession>,
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.orchestrator.list_sessions().await;
    Json(SessionListResponse { sessions })
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.orchestrator.inspect_session(&session_id).await {
        Some(session) => Json(session).into_response(),
        None => not_found(&session_id),
    }
}

#[derive(Serialize)]
struct DeleteResponse {
    session_id: String,
    deleted: bool,
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    if state.orchestrator.delete_session(&session_id) {
        Json(DeleteResponse {
            session_id,
            deleted: true,
        })
        .into_response()
    } else {
        not_found(&session_id)
    }
}

#[derive(Deserialize)]
pub struct CleanupRequest {
    #[serde(default = "default_max_age_hours")]
    max_age_hours: i64,
}

fn default_max_age_hours() -> i64 {
    24
}

#[derive(Serialize)]
struct CleanupResponse {
    removed: usize,
}

/// Body is optional (`{max_age_hours:int}` default 24); an empty body is not valid JSON, so
/// this reads the raw bytes and only parses when something was actually sent, rather than
/// relying on `Json<T>`'s extractor to reject an empty request.
pub async fn cleanup_sessions(State(state): State<AppState>, body: Bytes) -> Response {
    let max_age_hours = if body.is_empty() {
        default_max_age_hours()
    } else {
        match serde_json::from_slice::<CleanupRequest>(&body) {
            Ok(r) => r.max_age_hours,
            Err(e) => return bad_request(e),
        }
    };
    let removed = state.orchestrator.cleanup_sessions(max_age_hours).await;
    Json(CleanupResponse { removed }).into_response()
}
