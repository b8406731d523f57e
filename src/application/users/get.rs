use crate::application::users::ensure_self_or_admin;
use crate::domain::users::{User, UserRepository};
use crate::shared::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

pub struct GetUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl GetUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, id: Uuid, actor: &User) -> Result<User, AppError> {
        ensure_self_or_admin(actor, id)?;

        self.repo
            .find_by_id(id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
