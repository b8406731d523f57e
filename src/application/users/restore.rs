use crate::application::repo_error;
use crate::application::users::ensure_admin;
use crate::domain::users::{User, UserRepository};
use crate::shared::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

pub struct RestoreUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl RestoreUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn execute(&self, id: Uuid, actor: &User) -> Result<User, AppError> {
        ensure_admin(actor)?;

        let restored = self.repo.restore(id).await.map_err(repo_error)?;
        if !restored {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = %id, "User restored");
        self.repo
            .find_by_id(id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
