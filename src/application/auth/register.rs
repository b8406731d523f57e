use crate::application::auth::token_utils::{AuthResult, issue_tokens};
use crate::application::repo_error;
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, Role, UserRepository};
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub email: String,

    #[validate(length(
        min = 8,
        max = 20,
        message = "Password must be between 8 and 20 characters"
    ))]
    #[schema(example = "password123", min_length = 8, max_length = 20)]
    pub password: String,

    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    #[schema(example = "John Doe", min_length = 2, max_length = 50)]
    pub name: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    #[schema(example = "password123")]
    pub confirm_password: String,
}

pub struct RegisterUseCase {
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl RegisterUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        auth_service: Arc<dyn AuthService>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            auth_service,
            password_service,
        }
    }

    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn execute(&self, req: RegisterRequest) -> Result<AuthResult, AppError> {
        if self
            .user_repo
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
            .user_repo
            .create(NewUser {
                name: req.name.trim().to_string(),
                email: req.email,
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(repo_error)?;

        let tokens = issue_tokens(&user, &self.auth_service, &self.refresh_token_repo).await?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthResult { user, tokens })
    }
}
