use crate::application::auth::token_utils::{AuthResult, issue_tokens};
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::UserRepository;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "john@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl LoginUseCase {
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
    pub async fn execute(&self, req: LoginRequest) -> Result<AuthResult, AppError> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let user = self
            .user_repo
            .find_by_email(&req.email)
            .await
            .map_err(AppError::InternalServerError)?
            .ok_or_else(invalid)?;

        let valid_password = self
            .password_service
            .verify_password(&req.password, &user.password_hash)
            .map_err(AppError::InternalServerError)?;

        if !valid_password {
            tracing::info!(user_id = %user.id, "Rejected login with wrong password");
            return Err(invalid());
        }

        let tokens = issue_tokens(&user, &self.auth_service, &self.refresh_token_repo).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResult { user, tokens })
    }
}
