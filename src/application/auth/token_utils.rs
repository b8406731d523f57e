use crate::domain::auth::{AuthService, NewRefreshToken, RefreshTokenRepository};
use crate::domain::users::User;
use crate::shared::error::AppError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Access and refresh token pair handed to the client
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Outcome of a successful login, registration or OAuth sign-in
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub tokens: TokenResponse,
}

/// SHA-256 hex digest of a token string
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue an access + refresh pair for the user and persist the refresh token hash.
pub async fn issue_tokens(
    user: &User,
    auth_service: &Arc<dyn AuthService>,
    refresh_token_repo: &Arc<dyn RefreshTokenRepository>,
) -> Result<TokenResponse, AppError> {
    let access_token = auth_service.generate_access_token(user).await?;
    let refresh_token = auth_service.generate_refresh_token(user).await?;

    refresh_token_repo
        .create(NewRefreshToken {
            user_id: user.id,
            token_hash: hash_token(&refresh_token),
        })
        .await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: auth_service.access_token_expiry(),
    })
}
