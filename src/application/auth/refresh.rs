use crate::application::auth::token_utils::hash_token;
use crate::domain::auth::{AuthService, RefreshTokenRepository, TokenError, TokenType};
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;

/// New access token minted from a refresh token
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct RefreshTokenUseCase {
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
}

impl RefreshTokenUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        auth_service: Arc<dyn AuthService>,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            auth_service,
        }
    }

    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let token_hash = hash_token(refresh_token);

        let claims = match self
            .auth_service
            .validate_token(refresh_token, TokenType::Refresh)
            .await
        {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                // Expired tokens are purged so they cannot linger as active records.
                let removed = self
                    .refresh_token_repo
                    .delete_by_hash(&token_hash)
                    .await
                    .map_err(AppError::InternalServerError)?;
                tracing::info!(removed, "Refresh token expired");
                return Err(AppError::Unauthorized(
                    "Refresh token expired and was removed".to_string(),
                ));
            }
            Err(TokenError::MissingKeyId) => {
                return Err(AppError::Unauthorized(
                    "Missing kid in token header".to_string(),
                ));
            }
            Err(TokenError::Internal(e)) => return Err(AppError::InternalServerError(e)),
            Err(e) => {
                tracing::debug!(error = %e, "Refresh token rejected");
                return Err(AppError::Unauthorized("Invalid refresh token".to_string()));
            }
        };

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        self.refresh_token_repo
            .find_active_for_user(user.id, &token_hash)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| {
                AppError::Unauthorized("Refresh token is invalid or expired".to_string())
            })?;

        let access_token = self.auth_service.generate_access_token(&user).await?;

        Ok(RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.auth_service.access_token_expiry(),
        })
    }
}
