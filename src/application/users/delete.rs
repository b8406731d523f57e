use crate::application::users::{ensure_admin, ensure_self_or_admin};
use crate::domain::auth::RefreshTokenRepository;
use crate::domain::users::{User, UserRepository};
use crate::shared::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

pub struct DeleteUserUseCase {
    repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl DeleteUserUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        Self {
            repo,
            refresh_token_repo,
        }
    }

    /// Soft delete by default. `force` removes the row for good and is admin only.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn execute(&self, id: Uuid, force: bool, actor: &User) -> Result<(), AppError> {
        ensure_self_or_admin(actor, id)?;
        if force {
            ensure_admin(actor)?;
        }

        let removed = if force {
            self.repo.delete(id).await
        } else {
            self.repo.soft_delete(id).await
        }
        .map_err(AppError::InternalServerError)?;

        if !removed {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        // A removed account keeps no live sessions.
        self.refresh_token_repo
            .delete_by_user_id(id)
            .await
            .map_err(AppError::InternalServerError)?;

        tracing::info!(user_id = %id, force, "User deleted");
        Ok(())
    }
}
