mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{router_with, send};

#[tokio::test]
async fn health_reports_all_subsystems_healthy() {
    let app = router_with(r#"{"message":"ok"}"#);
    let (status, body) = send(app, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["services"]["workflow"], true);
    assert_eq!(json["services"]["session_manager"], true);
    assert_eq!(json["services"]["framework"], true);
}
