use crate::application::repo_error;
use crate::application::users::ensure_admin;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, Role, User, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "John Doe", min_length = 1, max_length = 100)]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"))]
    #[schema(example = "password123", min_length = 8, max_length = 20)]
    pub password: String,
    /// Defaults to `user`
    pub role: Option<Role>,
}

pub struct CreateUserUseCase {
    repo: Arc<dyn UserRepository>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl CreateUserUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            repo,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, req, actor), fields(email = %req.email, actor = %actor.id))]
    pub async fn execute(&self, req: CreateUserRequest, actor: &User) -> Result<User, AppError> {
        ensure_admin(actor)?;

        if self
            .repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?
            .is_some()
        {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self
            .password_service
            .hash_password(&req.password)
            .map_err(AppError::InternalServerError)?;

        let user = self
            .repo
            .create(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
                role: req.role.unwrap_or(Role::User),
            })
            .await
            .map_err(repo_error)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }
}
