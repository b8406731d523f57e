use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::users::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ
    pub jti: Uuid,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl Claims {
    pub fn new(user: &User, token_type: TokenType, expiry_seconds: i64) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now,
            exp: now + expiry_seconds,
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow::anyhow!("Invalid user ID in claims: {}", e))
    }
}

/// Why a token was rejected.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Missing kid in token header")]
    MissingKeyId,
    #[error("Unknown signing key")]
    UnknownKey,
    #[error("Token expired")]
    Expired,
    #[error("Unexpected token type")]
    WrongType,
    #[error("Invalid token")]
    Invalid,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Persisted refresh token. Only the SHA-256 of the token string is stored.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken>;

    /// Active token matching both the owner and the hash
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>>;

    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool>;

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<u64>;
}

/// Issues and verifies JWTs signed with the rotating keys.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn generate_access_token(&self, user: &User) -> Result<String>;

    async fn generate_refresh_token(&self, user: &User) -> Result<String>;

    async fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError>;

    /// Access token lifetime in seconds
    fn access_token_expiry(&self) -> i64;

    /// Refresh token lifetime in seconds
    fn refresh_token_expiry(&self) -> i64;
}
