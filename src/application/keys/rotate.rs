use crate::domain::keys::{KeyType, SigningKeyProvider};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// `None` when another rotation was already creating a key
    pub access_key: Option<Uuid>,
    pub refresh_key: Option<Uuid>,
    pub removed_access: u64,
    pub removed_refresh: u64,
}

/// Monthly key rotation: one new key per type, then purge keys past retention.
pub struct RotateKeysUseCase {
    keys: Arc<dyn SigningKeyProvider>,
    access_retention_days: i64,
    refresh_retention_days: i64,
}

impl RotateKeysUseCase {
    pub fn new(
        keys: Arc<dyn SigningKeyProvider>,
        access_retention_days: i64,
        refresh_retention_days: i64,
    ) -> Self {
        Self {
            keys,
            access_retention_days,
            refresh_retention_days,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self) -> Result<RotationReport> {
        let access_key = self.keys.add_key(KeyType::Access).await?.map(|k| k.id);
        let refresh_key = self.keys.add_key(KeyType::Refresh).await?.map(|k| k.id);

        let removed_access = self
            .keys
            .remove_old_keys(KeyType::Access, self.access_retention_days)
            .await?;
        let removed_refresh = self
            .keys
            .remove_old_keys(KeyType::Refresh, self.refresh_retention_days)
            .await?;

        let report = RotationReport {
            access_key,
            refresh_key,
            removed_access,
            removed_refresh,
        };
        tracing::info!(?report, "Signing keys rotated");
        Ok(report)
    }
}
