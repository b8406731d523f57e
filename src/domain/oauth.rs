use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
    Facebook,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            "facebook" => Ok(OAuthProvider::Facebook),
            _ => Err(OAuthError::UnknownProvider(s.to_string())),
        }
    }
}

/// Identity returned by a provider after a successful code exchange.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: OAuthProvider,
    pub provider_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Whether the provider vouches that the user owns `email`
    pub email_verified: bool,
}

/// A provider account linked to a local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub provider: OAuthProvider,
    pub subject: String,
    pub user_id: Uuid,
    /// Whether the email was verified when the link was made
    pub email_verified: bool,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),
    #[error("OAuth provider is not configured")]
    NotConfigured,
    #[error("OAuth provider did not return an email")]
    MissingEmail,
    #[error("OAuth provider email is not verified")]
    UnverifiedEmail,
    #[error("OAuth exchange failed: {0}")]
    Exchange(String),
}

#[async_trait]
pub trait OAuthGateway: Send + Sync {
    fn is_enabled(&self, provider: OAuthProvider) -> bool;

    /// Provider consent page carrying the CSRF `state`.
    fn authorize_url(&self, provider: OAuthProvider, state: &str) -> Result<String, OAuthError>;

    /// Exchange the callback `code` and fetch the user profile.
    async fn fetch_profile(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthProfile, OAuthError>;
}

#[async_trait]
pub trait OAuthIdentityRepository: Send + Sync {
    async fn find(
        &self,
        provider: OAuthProvider,
        subject: &str,
    ) -> anyhow::Result<Option<OAuthIdentity>>;

    async fn link(&self, identity: OAuthIdentity) -> anyhow::Result<()>;

    /// Remove the user's links made without a verified email.
    async fn delete_unverified_for_user(&self, user_id: Uuid) -> anyhow::Result<u64>;
}
