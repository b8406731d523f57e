use crate::application::auth::token_utils::{AuthResult, issue_tokens};
use crate::application::repo_error;
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::oauth::{
    OAuthError, OAuthGateway, OAuthIdentity, OAuthIdentityRepository, OAuthProfile, OAuthProvider,
};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, Role, User, UserRepository};
use crate::shared::error::AppError;
use std::sync::Arc;

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::UnknownProvider(_) => AppError::NotFound("Resource not found".to_string()),
            OAuthError::NotConfigured => {
                AppError::NotFound("OAuth provider is not configured".to_string())
            }
            OAuthError::MissingEmail => {
                AppError::BadRequest("OAuth provider did not return an email".to_string())
            }
            OAuthError::UnverifiedEmail => {
                AppError::BadRequest("OAuth provider email is not verified".to_string())
            }
            OAuthError::Exchange(detail) => {
                tracing::warn!(detail = %detail, "OAuth exchange failed");
                AppError::Unauthorized("Invalid credentials".to_string())
            }
        }
    }
}

/// Random CSRF value round-tripped through the provider.
pub fn generate_state() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Signs a user in from an external identity, creating the account on first use.
///
/// A provider account is matched by its linked identity first. Only a
/// verified email may attach it to an existing local account.
pub struct OAuthLoginUseCase {
    gateway: Arc<dyn OAuthGateway>,
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    identity_repo: Arc<dyn OAuthIdentityRepository>,
    auth_service: Arc<dyn AuthService>,
    password_service: Arc<dyn PasswordHashingService>,
}

impl OAuthLoginUseCase {
    pub fn new(
        gateway: Arc<dyn OAuthGateway>,
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        identity_repo: Arc<dyn OAuthIdentityRepository>,
        auth_service: Arc<dyn AuthService>,
        password_service: Arc<dyn PasswordHashingService>,
    ) -> Self {
        Self {
            gateway,
            user_repo,
            refresh_token_repo,
            identity_repo,
            auth_service,
            password_service,
        }
    }

    pub fn authorize_url(&self, provider: OAuthProvider, state: &str) -> Result<String, AppError> {
        Ok(self.gateway.authorize_url(provider, state)?)
    }

    #[tracing::instrument(skip(self, code))]
    pub async fn execute(&self, provider: OAuthProvider, code: &str) -> Result<AuthResult, AppError> {
        let profile = self.gateway.fetch_profile(provider, code).await?;
        self.sign_in(profile).await
    }

    /// Resolve the local account for a provider profile and issue tokens.
    pub async fn sign_in(&self, profile: OAuthProfile) -> Result<AuthResult, AppError> {
        let email = profile
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(OAuthError::MissingEmail)?;

        let linked = self
            .identity_repo
            .find(profile.provider, &profile.provider_id)
            .await
            .map_err(AppError::InternalServerError)?;

        let user = match linked {
            Some(identity) => self
                .user_repo
                .find_by_id(identity.user_id)
                .await
                .map_err(AppError::InternalServerError)?
                .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?,
            None => self.link_account(&profile, email).await?,
        };

        let tokens = issue_tokens(&user, &self.auth_service, &self.refresh_token_repo).await?;
        Ok(AuthResult { user, tokens })
    }

    /// First sign-in with this provider account: attach it to the account
    /// owning the email, or create one.
    async fn link_account(&self, profile: &OAuthProfile, email: String) -> Result<User, AppError> {
        let existing = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(AppError::InternalServerError)?;

        let user = match existing {
            Some(_) if !profile.email_verified => return Err(OAuthError::UnverifiedEmail.into()),
            Some(user) => user,
            None => self.create_user(profile, email).await?,
        };

        if profile.email_verified {
            // Links made on an unproven claim to this email lose access.
            let dropped = self
                .identity_repo
                .delete_unverified_for_user(user.id)
                .await
                .map_err(AppError::InternalServerError)?;
            if dropped > 0 {
                tracing::warn!(user_id = %user.id, dropped, "Dropped unverified OAuth links");
            }
        }

        self.identity_repo
            .link(OAuthIdentity {
                provider: profile.provider,
                subject: profile.provider_id.clone(),
                user_id: user.id,
                email_verified: profile.email_verified,
            })
            .await
            .map_err(AppError::InternalServerError)?;

        Ok(user)
    }

    async fn create_user(&self, profile: &OAuthProfile, email: String) -> Result<User, AppError> {
        let throwaway: [u8; 32] = rand::random();
        let password_hash = self
            .password_service
            .hash_password(&hex::encode(throwaway))
            .map_err(AppError::InternalServerError)?;

        let name = profile
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let user = self
            .user_repo
            .create(NewUser {
                name,
                email,
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(repo_error)?;
        tracing::info!(user_id = %user.id, provider = %profile.provider, "Created user from OAuth profile");
        Ok(user)
    }
}
