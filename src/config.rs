//! Application configuration management.
//!
//! Values are read from the environment (a `.env` file is loaded first when
//! present) and deserialized with `envy`: `database_url` maps to `DATABASE_URL`.

use serde::{Deserialize, Deserializer};
use sqlx::mysql::MySqlConnectOptions;
use std::str::FromStr;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` or `DATABASE_HOST`/`DATABASE_PORT`/`DATABASE_USERNAME`/
///   `DATABASE_PASSWORD`/`DATABASE_NAME`: MySQL connection
/// - `MASTER_KEY` (required): secret protecting the stored signing keys
/// - `JWT_ACCESS_TOKEN_EXPIRATION_TIME` / `JWT_REFRESH_TOKEN_EXPIRATION_TIME`:
///   plain seconds or `30s`, `15m`, `12h`, `7d`
/// - `GOOGLE_CLIENT_ID`/`GOOGLE_CLIENT_SECRET`, `GITHUB_CLIENT_ID`/`GITHUB_CLIENT_SECRET`,
///   `FACEBOOK_APP_ID`/`FACEBOOK_APP_SECRET`: a provider is disabled when unset
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    #[serde(default = "default_db_host")]
    pub database_host: String,
    #[serde(default = "default_db_port")]
    pub database_port: u16,
    #[serde(default = "default_db_username")]
    pub database_username: String,
    #[serde(default)]
    pub database_password: String,
    #[serde(default = "default_db_name")]
    pub database_name: String,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub db_idle_timeout_secs: u64,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub master_key: String,

    #[serde(
        default = "default_access_expiry",
        deserialize_with = "deserialize_duration"
    )]
    pub jwt_access_token_expiration_time: i64,
    #[serde(
        default = "default_refresh_expiry",
        deserialize_with = "deserialize_duration"
    )]
    pub jwt_refresh_token_expiration_time: i64,

    #[serde(default = "default_access_retention")]
    pub key_access_retention_days: i64,
    #[serde(default = "default_refresh_retention")]
    pub key_refresh_retention_days: i64,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    pub cors_allowed_origins: Option<String>,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,

    #[serde(default = "default_redirect_base")]
    pub oauth_redirect_base_url: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    pub facebook_app_id: Option<String>,
    pub facebook_app_secret: Option<String>,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_username() -> String {
    "root".to_string()
}

fn default_db_name() -> String {
    "boilerplate".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_port() -> u16 {
    3000
}

fn default_access_expiry() -> i64 {
    15 * 60
}

fn default_refresh_expiry() -> i64 {
    7 * 24 * 60 * 60
}

fn default_access_retention() -> i64 {
    31
}

fn default_refresh_retention() -> i64 {
    61
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_true() -> bool {
    true
}

fn default_redirect_base() -> String {
    "http://localhost:3000".to_string()
}

/// Parse `900`, `30s`, `15m`, `12h` or `7d` into seconds.
pub fn parse_duration_secs(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, multiplier) = match value.chars().last()? {
        's' => (&value[..value.len() - 1], 1),
        'm' => (&value[..value.len() - 1], 60),
        'h' => (&value[..value.len() - 1], 60 * 60),
        'd' => (&value[..value.len() - 1], 24 * 60 * 60),
        _ => (value, 1),
    };

    let amount: i64 = digits.trim().parse().ok()?;
    if amount <= 0 {
        return None;
    }
    amount.checked_mul(multiplier)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration_secs(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid duration `{}`", raw)))
}

/// Client credentials of one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    /// Configuration with defaults everywhere except the connection and master key.
    pub fn new(database_url: impl Into<String>, master_key: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            database_host: default_db_host(),
            database_port: default_db_port(),
            database_username: default_db_username(),
            database_password: String::new(),
            database_name: default_db_name(),
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            db_acquire_timeout_secs: default_acquire_timeout(),
            db_idle_timeout_secs: default_idle_timeout(),
            server_port: default_port(),
            master_key: master_key.into(),
            jwt_access_token_expiration_time: default_access_expiry(),
            jwt_refresh_token_expiration_time: default_refresh_expiry(),
            key_access_retention_days: default_access_retention(),
            key_refresh_retention_days: default_refresh_retention(),
            log_dir: default_log_dir(),
            cors_allowed_origins: None,
            cookie_secure: true,
            oauth_redirect_base_url: default_redirect_base(),
            google_client_id: None,
            google_client_secret: None,
            github_client_id: None,
            github_client_secret: None,
            facebook_app_id: None,
            facebook_app_secret: None,
        }
    }

    /// `DATABASE_URL` when set, otherwise the individual parts. The parts are
    /// passed as-is, so the password may contain any character.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, sqlx::Error> {
        match &self.database_url {
            Some(url) if !url.is_empty() => MySqlConnectOptions::from_str(url),
            _ => Ok(MySqlConnectOptions::new()
                .host(&self.database_host)
                .port(self.database_port)
                .username(&self.database_username)
                .password(&self.database_password)
                .database(&self.database_name)),
        }
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn google_credentials(&self) -> Option<OAuthCredentials> {
        pair(&self.google_client_id, &self.google_client_secret)
    }

    pub fn github_credentials(&self) -> Option<OAuthCredentials> {
        pair(&self.github_client_id, &self.github_client_secret)
    }

    pub fn facebook_credentials(&self) -> Option<OAuthCredentials> {
        pair(&self.facebook_app_id, &self.facebook_app_secret)
    }
}

fn pair(id: &Option<String>, secret: &Option<String>) -> Option<OAuthCredentials> {
    match (id, secret) {
        (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
            Some(OAuthCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
            })
        }
        _ => None,
    }
}
