use crate::application::auth::oauth::{OAuthLoginUseCase, generate_state};
use crate::domain::oauth::OAuthProvider;
use crate::infrastructure::state::AppState;
use crate::presentation::dtos::AuthResource;
use crate::presentation::handlers::auth::refresh_cookie;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::query::Qs;
use crate::shared::response::ApiResponse;
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::IntoParams;

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_PATH: &str = "/api/v1/auth";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn use_case(state: &AppState) -> OAuthLoginUseCase {
    OAuthLoginUseCase::new(
        state.oauth.clone(),
        state.user_repo.clone(),
        state.refresh_token_repo.clone(),
        state.oauth_identity_repo.clone(),
        state.auth_service.clone(),
        state.password_service.clone(),
    )
}

fn enabled_provider(state: &AppState, raw: &str) -> Result<OAuthProvider, AppError> {
    let provider: OAuthProvider = raw.parse()?;
    if !state.oauth.is_enabled(provider) {
        return Err(AppError::NotFound(
            "OAuth provider is not configured".to_string(),
        ));
    }
    Ok(provider)
}

/// Redirect to the provider consent page
#[utoipa::path(
    get,
    path = "/api/v1/auth/{provider}",
    params(("provider" = String, Path, description = "google, github or facebook")),
    responses(
        (status = 303, description = "Redirect to the provider"),
        (status = 404, description = "Unknown or unconfigured provider", body = ErrorResponse)
    ),
    tag = "oauth"
)]
pub async fn authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let provider = enabled_provider(&state, &provider)?;
    let csrf = generate_state();
    let url = use_case(&state).authorize_url(provider, &csrf)?;

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, csrf))
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .path(OAUTH_STATE_PATH)
        .max_age(time::Duration::minutes(10))
        .build();

    Ok((jar.add(cookie), Redirect::to(&url)))
}

/// Provider callback: exchange the code and sign the user in
#[utoipa::path(
    get,
    path = "/api/v1/auth/{provider}/callback",
    params(
        ("provider" = String, Path, description = "google, github or facebook"),
        OAuthCallbackQuery
    ),
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<AuthResource>),
        (status = 400, description = "State mismatch or missing email", body = ErrorResponse),
        (status = 401, description = "Code exchange failed", body = ErrorResponse),
        (status = 404, description = "Unknown or unconfigured provider", body = ErrorResponse)
    ),
    tag = "oauth"
)]
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
    Qs(params): Qs<OAuthCallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    let provider = enabled_provider(&state, &provider)?;

    let expected = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value());
    match (expected, params.state.as_deref()) {
        (Some(expected), Some(received)) if !expected.is_empty() && expected == received => {}
        _ => return Err(AppError::BadRequest("Invalid OAuth state".to_string())),
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let result = use_case(&state).execute(provider, &code).await?;

    let jar = jar
        .remove(Cookie::build(OAUTH_STATE_COOKIE).path(OAUTH_STATE_PATH))
        .add(refresh_cookie(&state, result.tokens.refresh_token.clone()));

    Ok((
        jar,
        Json(ApiResponse::ok(
            "Login successfully",
            AuthResource::from(result),
        )),
    ))
}
