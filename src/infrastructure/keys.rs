use crate::domain::keys::{
    ActiveKey, KeyCipher, KeyRepository, KeyType, NewSigningKey, SigningKey, SigningKeyProvider,
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Manages the encrypted signing keys stored in the database.
///
/// Key creation is serialized per process through an in-progress flag; two
/// instances of the service may still create keys concurrently.
pub struct KeyService {
    repo: Arc<dyn KeyRepository>,
    cipher: Arc<dyn KeyCipher>,
    creating: AtomicBool,
}

/// Clears the in-progress flag when dropped.
struct CreationGuard<'a>(&'a AtomicBool);

impl Drop for CreationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl KeyService {
    pub fn new(repo: Arc<dyn KeyRepository>, cipher: Arc<dyn KeyCipher>) -> Self {
        Self {
            repo,
            cipher,
            creating: AtomicBool::new(false),
        }
    }

    fn activate(&self, key: SigningKey) -> Result<ActiveKey> {
        let secret = self.cipher.decrypt(&key.encrypted_key)?;
        Ok(ActiveKey {
            id: key.id,
            key_type: key.key_type,
            secret,
        })
    }

    /// 32 random bytes, hex encoded.
    fn generate_material() -> String {
        let bytes: [u8; 32] = rand::random();
        hex::encode(bytes)
    }
}

#[async_trait]
impl SigningKeyProvider for KeyService {
    #[tracing::instrument(skip(self))]
    async fn add_key(&self, key_type: KeyType) -> Result<Option<SigningKey>> {
        if self
            .creating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Key creation already in progress for type: {}", key_type);
            return Ok(None);
        }
        let _guard = CreationGuard(&self.creating);

        let encrypted_key = self.cipher.encrypt(&Self::generate_material())?;
        let key = self
            .repo
            .create(NewSigningKey {
                encrypted_key,
                key_type,
            })
            .await
            .inspect_err(|e| tracing::error!("Error while adding {} key: {}", key_type, e))?;

        tracing::info!(key_id = %key.id, "Added new {} key", key_type);
        Ok(Some(key))
    }

    #[tracing::instrument(skip(self))]
    async fn remove_old_keys(&self, key_type: KeyType, retention_days: i64) -> Result<u64> {
        let cutoff = OffsetDateTime::now_utc() - Duration::days(retention_days);
        let removed = self.repo.delete_older_than(key_type, cutoff).await?;

        tracing::info!("Deleted {} old {} keys created before {}", removed, key_type, cutoff);
        Ok(removed)
    }

    async fn current_key(&self, key_type: KeyType) -> Result<ActiveKey> {
        if let Some(key) = self.repo.find_latest(key_type).await? {
            return self.activate(key);
        }

        self.add_key(key_type).await?;

        let key = self
            .repo
            .find_latest(key_type)
            .await?
            .ok_or_else(|| anyhow!("Failed to create or retrieve key for {}", key_type))?;
        self.activate(key)
    }

    async fn key_by_id(&self, id: Uuid) -> Result<Option<ActiveKey>> {
        match self.repo.find_by_id(id).await? {
            Some(key) => self.activate(key).map(Some),
            None => {
                tracing::warn!("Key not found: {}", id);
                Ok(None)
            }
        }
    }
}
