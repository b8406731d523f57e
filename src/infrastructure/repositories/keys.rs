use crate::domain::keys::{KeyRepository, KeyType, NewSigningKey, SigningKey};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::keys::SigningKeyDbModel;
use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

pub struct MySqlKeyRepository {
    pool: DbPool,
}

impl MySqlKeyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyRepository for MySqlKeyRepository {
    #[tracing::instrument(skip(self, key), fields(key_type = %key.key_type))]
    async fn create(&self, key: NewSigningKey) -> Result<SigningKey> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO signing_keys (id, encrypted_key, key_type) VALUES (?, ?, ?)")
            .bind(id)
            .bind(&key.encrypted_key)
            .bind(key.key_type.as_str())
            .execute(&self.pool)
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Signing key {} missing after insert", id))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SigningKey>> {
        let row = sqlx::query_as::<_, SigningKeyDbModel>(
            "SELECT id, encrypted_key, key_type, created_at FROM signing_keys WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SigningKey::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_latest(&self, key_type: KeyType) -> Result<Option<SigningKey>> {
        let row = sqlx::query_as::<_, SigningKeyDbModel>(
            r#"
            SELECT id, encrypted_key, key_type, created_at
            FROM signing_keys
            WHERE key_type = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(key_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SigningKey::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn delete_older_than(&self, key_type: KeyType, cutoff: OffsetDateTime) -> Result<u64> {
        let result = sqlx::query("DELETE FROM signing_keys WHERE key_type = ? AND created_at < ?")
            .bind(key_type.as_str())
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
