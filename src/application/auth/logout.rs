use crate::application::auth::token_utils::hash_token;
use crate::domain::auth::RefreshTokenRepository;
use crate::shared::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

pub struct LogoutUseCase {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl LogoutUseCase {
    pub fn new(refresh_token_repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { refresh_token_repo }
    }

    /// Forget a single refresh token. Unknown tokens are not an error.
    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn execute(&self, refresh_token: &str) -> Result<(), AppError> {
        let removed = self
            .refresh_token_repo
            .delete_by_hash(&hash_token(refresh_token))
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!(removed, "Logout");
        Ok(())
    }

    /// Drop every refresh token of the user, signing out all sessions.
    #[tracing::instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        let removed = self
            .refresh_token_repo
            .delete_by_user_id(user_id)
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!(removed, "Revoked all sessions");
        Ok(removed)
    }
}
