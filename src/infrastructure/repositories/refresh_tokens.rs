use crate::domain::auth::{NewRefreshToken, RefreshToken, RefreshTokenRepository};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::auth::RefreshTokenDbModel;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub struct MySqlRefreshTokenRepository {
    pool: DbPool,
}

impl MySqlRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    #[tracing::instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, is_active)
            VALUES (?, ?, ?, TRUE)
            "#,
        )
        .bind(id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .execute(&self.pool)
        .await?;

        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(
            r#"
            SELECT id, user_id, token_hash, is_active, created_at
            FROM refresh_tokens
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(token_db.into())
    }

    #[tracing::instrument(skip(self, token_hash))]
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>> {
        let token_db = sqlx::query_as::<_, RefreshTokenDbModel>(
            r#"
            SELECT id, user_id, token_hash, is_active, created_at
            FROM refresh_tokens
            WHERE user_id = ? AND token_hash = ? AND is_active = TRUE
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token_db.map(Into::into))
    }

    #[tracing::instrument(skip(self, token_hash))]
    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
