use crate::config::Config;
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::keys::SigningKeyProvider;
use crate::domain::oauth::{OAuthGateway, OAuthIdentityRepository};
use crate::domain::password::PasswordHashingService;
use crate::domain::users::UserRepository;
use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::crypto::AesKeyCipher;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::keys::KeyService;
use crate::infrastructure::oauth::HttpOAuthGateway;
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::repositories::keys::MySqlKeyRepository;
use crate::infrastructure::repositories::oauth_identities::MySqlOAuthIdentityRepository;
use crate::infrastructure::repositories::refresh_tokens::MySqlRefreshTokenRepository;
use crate::infrastructure::repositories::users::MySqlUserRepository;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub user_repo: Arc<dyn UserRepository>,
    pub refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    pub oauth_identity_repo: Arc<dyn OAuthIdentityRepository>,
    pub keys: Arc<dyn SigningKeyProvider>,
    pub auth_service: Arc<dyn AuthService>,
    pub password_service: Arc<dyn PasswordHashingService>,
    pub oauth: Arc<dyn OAuthGateway>,
}

impl AppState {
    /// Wire the MySQL-backed services.
    pub fn new(pool: DbPool, config: Config) -> anyhow::Result<Self> {
        let cipher = Arc::new(AesKeyCipher::new(&config.master_key)?);
        let keys: Arc<dyn SigningKeyProvider> = Arc::new(KeyService::new(
            Arc::new(MySqlKeyRepository::new(pool.clone())),
            cipher,
        ));
        let auth_service = Arc::new(JwtAuthService::new(
            keys.clone(),
            config.jwt_access_token_expiration_time,
            config.jwt_refresh_token_expiration_time,
        ));
        let oauth = Arc::new(HttpOAuthGateway::from_config(&config)?);

        Ok(Self {
            user_repo: Arc::new(MySqlUserRepository::new(pool.clone())),
            refresh_token_repo: Arc::new(MySqlRefreshTokenRepository::new(pool.clone())),
            oauth_identity_repo: Arc::new(MySqlOAuthIdentityRepository::new(pool.clone())),
            keys,
            auth_service,
            password_service: Arc::new(PasswordService::new()),
            oauth,
            config: Arc::new(config),
            pool,
        })
    }
}
