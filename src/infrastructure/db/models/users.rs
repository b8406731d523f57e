use crate::domain::users::User;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Column list matching `UserDbModel`.
pub const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at, deleted_at";

#[derive(Debug, Clone, FromRow)]
pub struct UserDbModel {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

impl TryFrom<UserDbModel> for User {
    type Error = anyhow::Error;

    fn try_from(model: UserDbModel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}
