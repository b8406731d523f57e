use crate::application::repo_error;
use crate::application::users::ensure_self_or_admin;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{Role, UpdateUser, User, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "John Updated", min_length = 1, max_length = 100)]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "new@example.com")]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    #[schema(example = "newpassword123", min_length = 8, max_length = 20)]
    pub password: Option<String>,
    /// Admin only
    pub role: Option<Role>,
}

pub struct UpdateUserUseCase {
    repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl UpdateUserUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            repo,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, req, actor), fields(actor = %actor.id))]
    pub async fn execute(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
        actor: &User,
    ) -> Result<User, AppError> {
        ensure_self_or_admin(actor, id)?;
        if req.role.is_some() && !actor.is_admin() {
            return Err(AppError::Forbidden("Insufficient permissions".to_string()));
        }

        let existing = self
            .repo
            .find_by_id(id)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(email) = &req.email {
            if let Some(owner) = self
                .repo
                .find_by_email(email)
                .await
                .map_err(AppError::InternalServerError)?
            {
                if owner.id != existing.id {
                    return Err(AppError::Conflict("Email already exists".to_string()));
                }
            }
        }

        let password_hash = req
            .password
            .as_deref()
            .map(|p| self.password_service.hash_password(p))
            .transpose()
            .map_err(AppError::InternalServerError)?;

        let update = UpdateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
        };

        if update.is_empty() {
            return Ok(existing);
        }

        let user = self.repo.update(id, update).await.map_err(repo_error)?;
        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }
}
