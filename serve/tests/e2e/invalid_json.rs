mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{router_with, send};

#[tokio::test]
async fn chat_with_missing_user_message_field_is_a_bad_request() {
    let app = router_with(r#"{"message":"ok"}"#);
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"session_id":"abc"}"#))
        .unwrap();

    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_with_non_object_body_is_a_bad_request() {
    let app = router_with(r#"{"message":"ok"}"#);
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("[1,2,3]"))
        .unwrap();

    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cleanup_with_malformed_body_is_a_bad_request() {
    let app = router_with(r#"{"message":"ok"}"#);
    let req = Request::builder()
        .method("POST")
        .uri("/api/sessions/cleanup")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
