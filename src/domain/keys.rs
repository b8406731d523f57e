use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Access,
    Refresh,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Access => "access_key",
            KeyType::Refresh => "refresh_key",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access_key" => Ok(KeyType::Access),
            "refresh_key" => Ok(KeyType::Refresh),
            other => Err(anyhow::anyhow!("Unknown key type: {}", other)),
        }
    }
}

/// Stored signing key, material still encrypted.
#[derive(Debug, Clone)]
pub struct SigningKey {
    pub id: Uuid,
    pub encrypted_key: String,
    pub key_type: KeyType,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSigningKey {
    pub encrypted_key: String,
    pub key_type: KeyType,
}

/// Decrypted key ready for signing or verification.
#[derive(Clone)]
pub struct ActiveKey {
    pub id: Uuid,
    pub key_type: KeyType,
    pub secret: String,
}

impl fmt::Debug for ActiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveKey")
            .field("id", &self.id)
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait KeyRepository: Send + Sync {
    async fn create(&self, key: NewSigningKey) -> Result<SigningKey>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SigningKey>>;
    /// Newest key of the type
    async fn find_latest(&self, key_type: KeyType) -> Result<Option<SigningKey>>;
    async fn delete_older_than(&self, key_type: KeyType, cutoff: OffsetDateTime) -> Result<u64>;
}

/// Symmetric protection of key material at rest.
pub trait KeyCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String>;
    fn decrypt(&self, encrypted: &str) -> Result<String>;
}

#[async_trait]
pub trait SigningKeyProvider: Send + Sync {
    /// Creates and stores a fresh key. `None` when another creation is in progress.
    async fn add_key(&self, key_type: KeyType) -> Result<Option<SigningKey>>;

    /// Deletes keys of the type older than the retention window; returns the count.
    async fn remove_old_keys(&self, key_type: KeyType, retention_days: i64) -> Result<u64>;

    /// Newest key of the type, created on demand when none exists.
    async fn current_key(&self, key_type: KeyType) -> Result<ActiveKey>;

    async fn key_by_id(&self, id: Uuid) -> Result<Option<ActiveKey>>;
}
