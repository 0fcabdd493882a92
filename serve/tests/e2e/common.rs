//! Shared helpers for the e2e tests: build a router over a `MockLlm`-backed orchestrator and
//! drive it in-process with `tower::ServiceExt::oneshot`, the HTTP analogue of the teacher's
//! WebSocket-frame e2e harness.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use intake_config::{PersonaSet, ToolEndpoints};
use intake_core::{MockLlm, Orchestrator, SessionStore};
use serve::AppState;

pub fn personas(dir: &Path) -> PersonaSet {
    for key in ["coordinator", "intake", "credit", "income", "risk"] {
        std::fs::write(
            dir.join(format!("{key}.md")),
            format!("you are the {key} specialist"),
        )
        .unwrap();
    }
    PersonaSet::load(dir).unwrap()
}

/// Builds a router whose orchestrator always gets `llm_content` back from the model.
pub fn router_with(llm_content: &str) -> axum::Router {
    let dir = tempfile::tempdir().unwrap();
    let personas = Arc::new(personas(dir.path()));
    let endpoints = Arc::new(ToolEndpoints::load(None).unwrap());
    let llm: Arc<dyn intake_core::LlmClient> = Arc::new(MockLlm::with_content(llm_content));
    let store = Arc::new(SessionStore::new());
    let orchestrator = Orchestrator::new(llm, endpoints, personas, store).unwrap();
    serve::test_router(AppState::new(orchestrator))
}

pub async fn send(app: axum::Router, req: Request<Body>) -> (axum::http::StatusCode, String) {
    let response: Response<Body> = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
