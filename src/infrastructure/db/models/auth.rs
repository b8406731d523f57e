use crate::domain::auth::RefreshToken;
use crate::domain::oauth::{OAuthError, OAuthIdentity};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenDbModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

impl From<RefreshTokenDbModel> for RefreshToken {
    fn from(model: RefreshTokenDbModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            token_hash: model.token_hash,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OAuthIdentityDbModel {
    pub provider: String,
    pub subject: String,
    pub user_id: Uuid,
    pub email_verified: bool,
}

impl TryFrom<OAuthIdentityDbModel> for OAuthIdentity {
    type Error = OAuthError;

    fn try_from(model: OAuthIdentityDbModel) -> Result<Self, Self::Error> {
        Ok(Self {
            provider: model.provider.parse()?,
            subject: model.subject,
            user_id: model.user_id,
            email_verified: model.email_verified,
        })
    }
}
