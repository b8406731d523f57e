use crate::common;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use boilerplate::presentation::router::app;

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn start(app: &Router) -> (HeaderMap, String) {
    let (status, headers, _) = common::send(app, get("/api/v1/auth/github", None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let cookie = common::cookie_pair(&headers, "oauth_state").unwrap();
    (headers, cookie)
}

#[tokio::test]
async fn test_unknown_and_unconfigured_providers() {
    let app = app(common::mock_state());

    let (status, _, _) = common::send(&app, get("/api/v1/auth/myspace", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = common::send(&app, get("/api/v1/auth/google", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["errors"][0]["detail"],
        "OAuth provider is not configured"
    );
}

#[tokio::test]
async fn test_authorize_redirects_with_state_cookie() {
    let app = app(common::mock_state());

    let (headers, cookie) = start(&app).await;

    let state = cookie.trim_start_matches("oauth_state=");
    assert_eq!(state.len(), 32);
    let location = headers.get("location").unwrap().to_str().unwrap();
    assert!(location.ends_with(&format!("state={}", state)));
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let app = app(common::mock_state());
    let (_, cookie) = start(&app).await;

    let (status, _, body) = common::send(
        &app,
        get(
            "/api/v1/auth/github/callback?code=good&state=forged",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["detail"], "Invalid OAuth state");

    let (status, _, _) = common::send(
        &app,
        get("/api/v1/auth/github/callback?code=good&state=whatever", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_signs_in() {
    let app = app(common::mock_state());
    let (_, cookie) = start(&app).await;
    let state = cookie.trim_start_matches("oauth_state=").to_string();

    let (status, headers, body) = common::send(
        &app,
        get(
            &format!("/api/v1/auth/github/callback?code=good&state={}", state),
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successfully");
    assert_eq!(body["data"]["user"]["email"], "octocat@example.com");
    assert_eq!(body["data"]["user"]["name"], "The Octocat");
    assert!(common::cookie_pair(&headers, "refreshToken").is_some());
    assert_eq!(
        common::cookie_pair(&headers, "oauth_state").as_deref(),
        Some("oauth_state=")
    );
}

#[tokio::test]
async fn test_callback_bad_code_is_unauthorized() {
    let app = app(common::mock_state());
    let (_, cookie) = start(&app).await;
    let state = cookie.trim_start_matches("oauth_state=").to_string();

    let (status, _, body) = common::send(
        &app,
        get(
            &format!("/api/v1/auth/github/callback?code=bad&state={}", state),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["detail"], "Invalid credentials");

    let (status, _, body) = common::send(
        &app,
        get(
            &format!("/api/v1/auth/github/callback?state={}", state),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["detail"], "Missing authorization code");
}
