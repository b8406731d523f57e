use crate::domain::oauth::{OAuthIdentity, OAuthIdentityRepository, OAuthProvider};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::auth::OAuthIdentityDbModel;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub struct MySqlOAuthIdentityRepository {
    pool: DbPool,
}

impl MySqlOAuthIdentityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OAuthIdentityRepository for MySqlOAuthIdentityRepository {
    #[tracing::instrument(skip(self))]
    async fn find(&self, provider: OAuthProvider, subject: &str) -> Result<Option<OAuthIdentity>> {
        let identity_db = sqlx::query_as::<_, OAuthIdentityDbModel>(
            r#"
            SELECT provider, subject, user_id, email_verified
            FROM oauth_identities
            WHERE provider = ? AND subject = ?
            "#,
        )
        .bind(provider.as_str())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity_db.map(OAuthIdentity::try_from).transpose()?)
    }

    #[tracing::instrument(skip(self, identity), fields(provider = %identity.provider, user_id = %identity.user_id))]
    async fn link(&self, identity: OAuthIdentity) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO oauth_identities (provider, subject, user_id, email_verified)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(identity.provider.as_str())
        .bind(&identity.subject)
        .bind(identity.user_id)
        .bind(identity.email_verified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_unverified_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM oauth_identities WHERE user_id = ? AND email_verified = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
