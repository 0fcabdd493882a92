mod common;

use axum::body::Body;
use axum::http::StatusCode;
use common::{json_request, router_with, send};

/// One unified JSON blob: read as `{"message":...}` by the coordinator, and as
/// `{"confidence":...,"reasoning":...}` (plus empty factor/condition arrays) by every
/// pipeline specialist — each deserializer only reads the fields it declares.
const UNIFIED_CONTENT: &str = r#"{"message":"ok","confidence":0.9,"reasoning":"looks fine","positive_factors":[],"negative_factors":[],"conditions":[]}"#;

fn ndjson_lines(body: &str) -> Vec<serde_json::Value> {
    body.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn a_partial_turn_returns_a_single_collect_info_line() {
    let app = router_with(UNIFIED_CONTENT);
    let req = json_request("POST", "/api/chat", r#"{"user_message":"300000"}"#);

    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
    let lines = ndjson_lines(&body);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["action"], "collect_info");
    assert_eq!(lines[0]["completion_percentage"], 25);
    assert!(lines[0]["session_id"].is_string());
}

#[tokio::test]
async fn completing_intake_streams_the_reply_then_pipeline_events() {
    let app = router_with(UNIFIED_CONTENT);

    let first = send(
        app.clone(),
        json_request("POST", "/api/chat", r#"{"user_message":"300000"}"#),
    )
    .await;
    let session_id = ndjson_lines(&first.1)[0]["session_id"].as_str().unwrap().to_string();

    let turn = |app: axum::Router, body: String| async move {
        send(app, json_request("POST", "/api/chat", &body)).await
    };

    let body2 = format!(r#"{{"user_message":"20","session_id":"{session_id}"}}"#);
    turn(app.clone(), body2).await;
    let body3 = format!(r#"{{"user_message":"150000","session_id":"{session_id}"}}"#);
    turn(app.clone(), body3).await;

    let body4 = format!(
        r#"{{"user_message":"{{\"name\":\"Tony Stark\",\"email\":\"tony@stark.com\",\"idLast4\":\"1234\"}}","session_id":"{session_id}"}}"#
    );
    let (status, body) = send(app, json_request("POST", "/api/chat", &body4)).await;

    assert_eq!(status, StatusCode::OK);
    let lines = ndjson_lines(&body);
    assert_eq!(lines[0]["action"], "ready_for_processing");
    assert_eq!(lines[0]["completion_percentage"], 100);
    // The pipeline runs in the background and streams at least one more line (a stage
    // event, or an error event if a specialist's tool lookup has nothing configured);
    // either way the NDJSON body is not just the coordinator's single reply line.
    assert!(lines.len() > 1, "expected pipeline events appended after the reply line");
    assert!(lines[1]["session_id"].is_string());
    assert_eq!(lines[1]["event_id"], 1);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = router_with(UNIFIED_CONTENT);
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
