use crate::domain::auth::{AuthService, Claims, TokenError, TokenType};
use crate::domain::keys::{KeyType, SigningKeyProvider};
use crate::domain::users::User;
use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode};
use std::sync::Arc;
use uuid::Uuid;

/// JWT service signing with HS256 under the current rotating key.
///
/// The signing key id travels in the `kid` header so tokens stay verifiable
/// after rotation, until the key is purged.
pub struct JwtAuthService {
    keys: Arc<dyn SigningKeyProvider>,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl JwtAuthService {
    pub fn new(
        keys: Arc<dyn SigningKeyProvider>,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Self {
        Self {
            keys,
            access_token_expiry,
            refresh_token_expiry,
        }
    }

    async fn sign(&self, user: &User, token_type: TokenType) -> Result<String> {
        let (key_type, expiry) = match token_type {
            TokenType::Access => (KeyType::Access, self.access_token_expiry),
            TokenType::Refresh => (KeyType::Refresh, self.refresh_token_expiry),
        };

        let key = self.keys.current_key(key_type).await?;
        let claims = Claims::new(user, token_type, expiry);

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(key.id.to_string());

        encode(&header, &claims, &EncodingKey::from_secret(key.secret.as_bytes()))
            .map_err(|e| anyhow::anyhow!("Failed to generate {:?} token: {}", token_type, e))
    }
}

#[async_trait]
impl AuthService for JwtAuthService {
    async fn generate_access_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Access).await
    }

    async fn generate_refresh_token(&self, user: &User) -> Result<String> {
        self.sign(user, TokenType::Refresh).await
    }

    async fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Invalid)?;
        let kid = header.kid.ok_or(TokenError::MissingKeyId)?;
        let key_id = Uuid::parse_str(&kid).map_err(|_| TokenError::UnknownKey)?;

        let key = self
            .keys
            .key_by_id(key_id)
            .await?
            .ok_or(TokenError::UnknownKey)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(key.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        let expected_key = match expected {
            TokenType::Access => KeyType::Access,
            TokenType::Refresh => KeyType::Refresh,
        };
        if data.claims.token_type != expected || key.key_type != expected_key {
            return Err(TokenError::WrongType);
        }

        Ok(data.claims)
    }

    fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    fn refresh_token_expiry(&self) -> i64 {
        self.refresh_token_expiry
    }
}
