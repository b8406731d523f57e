pub mod models;
pub mod paginate;

use crate::config::Config;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{MySql, Pool};
use std::time::Duration;

pub type DbPool = Pool<MySql>;

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl From<&Config> for PoolSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections.min(config.db_max_connections),
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
            idle_timeout: Duration::from_secs(config.db_idle_timeout_secs),
        }
    }
}

pub async fn create_pool(
    options: MySqlConnectOptions,
    settings: &PoolSettings,
) -> Result<DbPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .connect_with(options)
        .await
}

/// Apply the schema in `migrations/`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
