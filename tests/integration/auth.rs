use crate::common;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use boilerplate::presentation::router::app;
use serde_json::json;
use std::sync::Arc;

const REGISTER: &str = "/api/v1/auth/register";
const LOGIN: &str = "/api/v1/auth/login";
const REFRESH: &str = "/api/v1/auth/refresh";
const LOGOUT: &str = "/api/v1/auth/logout";

fn register_body(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "password123",
        "name": "Jane Doe",
        "confirmPassword": "password123"
    })
}

fn with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

/// Full `set-cookie` line of the refresh cookie.
fn raw_refresh_cookie(headers: &HeaderMap) -> String {
    headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refreshToken="))
        .unwrap()
        .to_string()
}

async fn register(app: &Router, email: &str) -> (StatusCode, String, serde_json::Value) {
    let (status, headers, body) =
        common::send(app, common::json_request("POST", REGISTER, register_body(email))).await;
    let cookie = common::cookie_pair(&headers, "refreshToken").unwrap_or_default();
    (status, cookie, body)
}

#[tokio::test]
async fn test_register_returns_tokens_and_cookie() {
    let app = app(common::mock_state());

    let (status, cookie, body) = register(&app, "Jane@Example.com").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "Register successfully");
    assert_eq!(body["data"]["user"]["email"], "jane@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert_eq!(body["data"]["tokenType"], "Bearer");
    assert!(body["data"]["accessToken"].is_string());
    assert_eq!(
        cookie,
        format!(
            "refreshToken={}",
            body["data"]["refreshToken"].as_str().unwrap()
        )
    );
}

#[tokio::test]
async fn test_refresh_cookie_attributes() {
    let app = app(common::mock_state());

    let (_, headers, _) = common::send(
        &app,
        common::json_request("POST", REGISTER, register_body("jane@example.com")),
    )
    .await;

    let raw = raw_refresh_cookie(&headers);
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=None"));
    assert!(raw.contains("Path=/"));
    assert!(raw.contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app(common::mock_state());

    register(&app, "jane@example.com").await;
    let (status, _, body) = register(&app, "JANE@example.com").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["status"], 409);
    assert_eq!(body["errors"][0]["detail"], "Email already exists");
}

#[tokio::test]
async fn test_error_detail_translated_for_vietnamese() {
    let app = app(common::mock_state());
    register(&app, "jane@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri(REGISTER)
        .header("content-type", "application/json")
        .header("accept-language", "vi-VN,vi;q=0.9")
        .body(Body::from(register_body("jane@example.com").to_string()))
        .unwrap();
    let (status, _, body) = common::send(&app, request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["detail"], "Email đã tồn tại");

    let (_, _, body) = common::send(
        &app,
        common::json_request(
            "POST",
            "/api/v1/auth/login?lang=vi",
            json!({"email": "nobody@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(
        body["errors"][0]["detail"],
        "Email hoặc mật khẩu không chính xác"
    );
}

#[tokio::test]
async fn test_register_validation() {
    let app = app(common::mock_state());

    let (status, _, body) = common::send(
        &app,
        common::json_request(
            "POST",
            REGISTER,
            json!({
                "email": "jane@example.com",
                "password": "password123",
                "name": "Jane Doe",
                "confirmPassword": "different123"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["errors"][0]["detail"]
            .as_str()
            .unwrap()
            .contains("Passwords do not match")
    );

    let (status, _, _) = common::send(
        &app,
        common::json_request(
            "POST",
            REGISTER,
            json!({
                "email": "not-an-email",
                "password": "short",
                "name": "J",
                "confirmPassword": "short"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_refresh_logout_cycle() {
    let app = app(common::mock_state());
    register(&app, "jane@example.com").await;

    let (status, headers, body) = common::send(
        &app,
        common::json_request(
            "POST",
            LOGIN,
            json!({"email": "jane@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successfully");
    let cookie = common::cookie_pair(&headers, "refreshToken").unwrap();

    let (status, _, body) = common::send(&app, with_cookie("POST", REFRESH, &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Refresh token successfully");
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"].get("refreshToken").is_none());

    let (status, headers, body) = common::send(&app, with_cookie("POST", LOGOUT, &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successfully");
    assert!(body["data"].is_null());
    assert_eq!(
        common::cookie_pair(&headers, "refreshToken").as_deref(),
        Some("refreshToken=")
    );

    let (status, _, body) = common::send(&app, with_cookie("POST", REFRESH, &cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["errors"][0]["detail"],
        "Refresh token is invalid or expired"
    );
}

#[tokio::test]
async fn test_logout_cookie_matches_refresh_cookie_attributes() {
    let mut state = common::mock_state();
    let mut config = (*state.config).clone();
    config.cookie_secure = true;
    state.config = Arc::new(config);
    let app = app(state.clone());

    let (_, cookie, body) = register(&app, "jane@example.com").await;
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (_, headers, _) = common::send(&app, with_cookie("POST", LOGOUT, &cookie)).await;
    let raw = raw_refresh_cookie(&headers);
    assert!(raw.starts_with("refreshToken=;"));
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("Secure"));
    assert!(raw.contains("SameSite=None"));
    assert!(raw.contains("Path=/"));
    assert!(raw.contains("Max-Age=0"));

    // Cleared even when the request carried no cookie.
    let (status, headers, _) = common::send(
        &app,
        common::authed("POST", "/api/v1/auth/logout-all", &access, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let raw = raw_refresh_cookie(&headers);
    assert!(raw.contains("SameSite=None"));
    assert!(raw.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = app(common::mock_state());
    register(&app, "jane@example.com").await;

    let (status, _, body) = common::send(
        &app,
        common::json_request(
            "POST",
            LOGIN,
            json!({"email": "jane@example.com", "password": "wrongpass1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = app(common::mock_state());

    let (status, _, body) = common::send(
        &app,
        Request::builder()
            .method("POST")
            .uri(REFRESH)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["detail"], "Missing refresh token");
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let state = common::mock_state();
    let app = app(state.clone());

    let (_, first_cookie, body) = register(&app, "jane@example.com").await;
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();

    // Second session, issued within the same second.
    let (_, headers, _) = common::send(
        &app,
        common::json_request(
            "POST",
            LOGIN,
            json!({"email": "jane@example.com", "password": "password123"}),
        ),
    )
    .await;
    let second_cookie = common::cookie_pair(&headers, "refreshToken").unwrap();

    let (status, _, body) = common::send(
        &app,
        common::authed("POST", "/api/v1/auth/logout-all", &access, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], 2);

    for cookie in [first_cookie, second_cookie] {
        let (status, _, _) = common::send(&app, with_cookie("POST", REFRESH, &cookie)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_logout_all_requires_bearer() {
    let app = app(common::mock_state());

    let (status, _, body) = common::send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/logout-all")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["detail"], "Missing Authorization header");
}
