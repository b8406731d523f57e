use crate::domain::keys::SigningKey;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SigningKeyDbModel {
    pub id: Uuid,
    pub encrypted_key: String,
    pub key_type: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<SigningKeyDbModel> for SigningKey {
    type Error = anyhow::Error;

    fn try_from(model: SigningKeyDbModel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            encrypted_key: model.encrypted_key,
            key_type: model.key_type.parse()?,
            created_at: model.created_at,
        })
    }
}
