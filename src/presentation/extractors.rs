use crate::domain::auth::{Claims, TokenError, TokenType};
use crate::domain::users::User;
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Authenticated user extractor.
/// Verifies the bearer access token and loads the active user it belongs to.
pub struct AuthUser {
    pub user: User,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Invalid Authorization header format".to_string())
            })?;

        let claims = state
            .auth_service
            .validate_token(token, TokenType::Access)
            .await
            .map_err(|e| match e {
                TokenError::MissingKeyId => {
                    AppError::Unauthorized("Missing kid in token header".to_string())
                }
                TokenError::Internal(e) => AppError::InternalServerError(e),
                _ => AppError::Unauthorized("Invalid or expired token".to_string()),
            })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        let user = state
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(AuthUser { user, claims })
    }
}
