use crate::common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use boilerplate::presentation::router::app;

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let app = app(common::mock_state());

    let (status, _, body) = common::send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app(common::mock_state());

    let (status, _, body) = common::send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/users"].is_object());
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app(common::mock_state());

    let (status, _, _) = common::send(
        &app,
        Request::builder()
            .uri("/api/v1/nothing")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
