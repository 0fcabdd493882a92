mod common;

use axum::http::StatusCode;
use common::{json_request, router_with, send};

#[tokio::test]
async fn a_new_session_appears_in_the_session_list() {
    let app = router_with(r#"{"message":"ok"}"#);
    let (_, body) = send(
        app.clone(),
        json_request("POST", "/api/chat", r#"{"user_message":"300000"}"#),
    )
    .await;
    let session_id: serde_json::Value = serde_json::from_str(&body).unwrap();
    let session_id = session_id["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        axum::http::Request::builder()
            .uri("/api/sessions")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let sessions = json["sessions"].as_array().unwrap();
    assert!(sessions.iter().any(|s| s["session_id"] == session_id));
}

#[tokio::test]
async fn get_session_returns_404_for_an_unknown_id() {
    let app = router_with(r#"{"message":"ok"}"#);
    let (status, _) = send(
        app,
        axum::http::Request::builder()
            .uri("/api/sessions/does-not-exist")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_session_removes_a_known_session_then_404s_on_retry() {
    let app = router_with(r#"{"message":"ok"}"#);
    let (_, body) = send(
        app.clone(),
        json_request("POST", "/api/chat", r#"{"user_message":"300000"}"#),
    )
    .await;
    let reply: serde_json::Value = serde_json::from_str(&body).unwrap();
    let session_id = reply["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app.clone(),
        axum::http::Request::builder()
            .method("DELETE")
            .uri(format!("/api/sessions/{session_id}"))
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["deleted"], true);

    let (status, _) = send(
        app,
        axum::http::Request::builder()
            .method("DELETE")
            .uri(format!("/api/sessions/{session_id}"))
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cleanup_with_an_empty_body_uses_the_default_max_age() {
    let app = router_with(r#"{"message":"ok"}"#);
    send(
        app.clone(),
        json_request("POST", "/api/chat", r#"{"user_message":"300000"}"#),
    )
    .await;

    let (status, body) = send(
        app,
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/sessions/cleanup")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    // A freshly created session is never stale against the default 24h cutoff.
    assert_eq!(json["removed"], 0);
}
