use crate::application::auth::login::{LoginRequest, LoginUseCase};
use crate::application::auth::logout::LogoutUseCase;
use crate::application::auth::refresh::{RefreshResponse, RefreshTokenUseCase};
use crate::application::auth::register::{RegisterRequest, RegisterUseCase};
use crate::infrastructure::state::AppState;
use crate::presentation::dtos::AuthResource;
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::ApiResponse;
use crate::shared::validation::ValidatedJson;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// Http-only refresh cookie living as long as the token itself.
pub fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::None)
        .path("/")
        .max_age(time::Duration::seconds(
            state.auth_service.refresh_token_expiry(),
        ))
        .build()
}

/// Expired copy of the refresh cookie. Browsers only drop a cookie whose
/// attributes match, so it is built like the original.
fn clear_refresh_cookie(state: &AppState, jar: CookieJar) -> CookieJar {
    let mut cookie = refresh_cookie(state, String::new());
    cookie.make_removal();
    jar.add(cookie)
}

/// Register handler
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered and signed in", body = ApiResponse<AuthResource>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = RegisterUseCase::new(
        state.user_repo.clone(),
        state.refresh_token_repo.clone(),
        state.auth_service.clone(),
        state.password_service.clone(),
    );

    let result = use_case.execute(req).await?;
    let jar = jar.add(refresh_cookie(&state, result.tokens.refresh_token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiResponse::created(
            "Register successfully",
            AuthResource::from(result),
        )),
    ))
}

/// Login handler
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResource>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = LoginUseCase::new(
        state.user_repo.clone(),
        state.refresh_token_repo.clone(),
        state.auth_service.clone(),
        state.password_service.clone(),
    );

    let result = use_case.execute(req).await?;
    let jar = jar.add(refresh_cookie(&state, result.tokens.refresh_token.clone()));

    Ok((
        jar,
        Json(ApiResponse::ok(
            "Login successfully",
            AuthResource::from(result),
        )),
    ))
}

/// Refresh token handler, reads the `refreshToken` cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (status = 200, description = "New access token", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Missing, invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let use_case = RefreshTokenUseCase::new(
        state.user_repo.clone(),
        state.refresh_token_repo.clone(),
        state.auth_service.clone(),
    );

    let response = use_case.execute(&token).await?;

    Ok(Json(ApiResponse::ok("Refresh token successfully", response)))
}

/// Logout handler, forgets the refresh token of this session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<serde_json::Value>)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        LogoutUseCase::new(state.refresh_token_repo.clone())
            .execute(cookie.value())
            .await?;
    }

    Ok((
        clear_refresh_cookie(&state, jar),
        Json(ApiResponse::ok("Logout successfully", serde_json::Value::Null)),
    ))
}

/// Revoke every refresh token of the signed-in user
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout-all",
    responses(
        (status = 200, description = "All sessions revoked", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let revoked = LogoutUseCase::new(state.refresh_token_repo.clone())
        .revoke_all(auth.user.id)
        .await?;

    Ok((
        clear_refresh_cookie(&state, jar),
        Json(ApiResponse::ok(
            "Logout successfully",
            json!({ "revoked": revoked }),
        )),
    ))
}
