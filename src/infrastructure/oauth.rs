use crate::config::{Config, OAuthCredentials};
use crate::domain::oauth::{OAuthError, OAuthGateway, OAuthProfile, OAuthProvider};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

const GOOGLE_AUTHORIZE: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const GITHUB_AUTHORIZE: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER: &str = "https://api.github.com/user";
const GITHUB_EMAILS: &str = "https://api.github.com/user/emails";

const FACEBOOK_AUTHORIZE: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const FACEBOOK_TOKEN: &str = "https://graph.facebook.com/v19.0/oauth/access_token";
const FACEBOOK_ME: &str = "https://graph.facebook.com/me";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    verified_email: bool,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

#[derive(Debug, Deserialize)]
struct FacebookUser {
    id: String,
    name: Option<String>,
    email: Option<String>,
}

/// The public profile email when it is among the verified addresses,
/// otherwise the verified primary one. Falls back to the unverified public
/// email so the caller can tell the two apart.
fn github_email(public: Option<String>, emails: Vec<GithubEmail>) -> (Option<String>, bool) {
    let verified: Vec<GithubEmail> = emails.into_iter().filter(|e| e.verified).collect();

    let public_verified = public
        .as_deref()
        .is_some_and(|p| verified.iter().any(|e| e.email.eq_ignore_ascii_case(p)));
    if public_verified {
        return (public, true);
    }
    match verified.into_iter().find(|e| e.primary) {
        Some(primary) => (Some(primary.email), true),
        None => (public, false),
    }
}

fn exchange_error(context: &str, err: impl std::fmt::Display) -> OAuthError {
    OAuthError::Exchange(format!("{}: {}", context, err))
}

/// OAuth 2.0 authorization-code flow against Google, GitHub and Facebook.
pub struct HttpOAuthGateway {
    client: Client,
    redirect_base_url: String,
    google: Option<OAuthCredentials>,
    github: Option<OAuthCredentials>,
    facebook: Option<OAuthCredentials>,
}

impl HttpOAuthGateway {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            redirect_base_url: config.oauth_redirect_base_url.trim_end_matches('/').to_string(),
            google: config.google_credentials(),
            github: config.github_credentials(),
            facebook: config.facebook_credentials(),
        })
    }

    fn credentials(&self, provider: OAuthProvider) -> Result<&OAuthCredentials, OAuthError> {
        match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Github => self.github.as_ref(),
            OAuthProvider::Facebook => self.facebook.as_ref(),
        }
        .ok_or(OAuthError::NotConfigured)
    }

    pub fn callback_url(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/api/v1/auth/{}/callback",
            self.redirect_base_url,
            provider.as_str()
        )
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, OAuthError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(exchange_error(context, format!("{} {}", status, body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| exchange_error(context, e))
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<String, OAuthError> {
        let creds = self.credentials(provider)?;
        let redirect_uri = self.callback_url(provider);

        let request = match provider {
            OAuthProvider::Google => self.client.post(GOOGLE_TOKEN).form(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ]),
            OAuthProvider::Github => self
                .client
                .post(GITHUB_TOKEN)
                .header(reqwest::header::ACCEPT, "application/json")
                .form(&[
                    ("code", code),
                    ("client_id", creds.client_id.as_str()),
                    ("client_secret", creds.client_secret.as_str()),
                    ("redirect_uri", redirect_uri.as_str()),
                ]),
            OAuthProvider::Facebook => self.client.get(FACEBOOK_TOKEN).query(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
            ]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| exchange_error("token request failed", e))?;
        let token: TokenResponse = Self::read_json(response, "token exchange failed").await?;
        Ok(token.access_token)
    }

    async fn github_emails(&self, access_token: &str) -> Result<Vec<GithubEmail>, OAuthError> {
        let response = self
            .client
            .get(GITHUB_EMAILS)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| exchange_error("email request failed", e))?;

        Self::read_json(response, "email lookup failed").await
    }
}

#[async_trait]
impl OAuthGateway for HttpOAuthGateway {
    fn is_enabled(&self, provider: OAuthProvider) -> bool {
        self.credentials(provider).is_ok()
    }

    fn authorize_url(&self, provider: OAuthProvider, state: &str) -> Result<String, OAuthError> {
        let creds = self.credentials(provider)?;
        let redirect_uri = self.callback_url(provider);

        let (base, scope) = match provider {
            OAuthProvider::Google => (GOOGLE_AUTHORIZE, "email profile"),
            OAuthProvider::Github => (GITHUB_AUTHORIZE, "read:user user:email"),
            OAuthProvider::Facebook => (FACEBOOK_AUTHORIZE, "email public_profile"),
        };

        let url = Url::parse_with_params(
            base,
            &[
                ("client_id", creds.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope),
                ("state", state),
            ],
        )
        .map_err(|e| exchange_error("invalid authorize url", e))?;

        Ok(url.to_string())
    }

    #[tracing::instrument(skip(self, code))]
    async fn fetch_profile(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthProfile, OAuthError> {
        let access_token = self.exchange_code(provider, code).await?;

        let profile = match provider {
            OAuthProvider::Google => {
                let response = self
                    .client
                    .get(GOOGLE_USERINFO)
                    .bearer_auth(&access_token)
                    .send()
                    .await
                    .map_err(|e| exchange_error("userinfo request failed", e))?;
                let user: GoogleUser = Self::read_json(response, "userinfo failed").await?;
                OAuthProfile {
                    provider,
                    provider_id: user.id,
                    email: user.email,
                    name: user.name,
                    email_verified: user.verified_email,
                }
            }
            OAuthProvider::Github => {
                let response = self
                    .client
                    .get(GITHUB_USER)
                    .bearer_auth(&access_token)
                    .send()
                    .await
                    .map_err(|e| exchange_error("user request failed", e))?;
                let user: GithubUser = Self::read_json(response, "user lookup failed").await?;
                let emails = self.github_emails(&access_token).await?;
                let (email, email_verified) = github_email(user.email, emails);
                OAuthProfile {
                    provider,
                    provider_id: user.id.to_string(),
                    email,
                    name: user.name.or(Some(user.login)),
                    email_verified,
                }
            }
            OAuthProvider::Facebook => {
                let response = self
                    .client
                    .get(FACEBOOK_ME)
                    .query(&[
                        ("fields", "id,name,email"),
                        ("access_token", access_token.as_str()),
                    ])
                    .send()
                    .await
                    .map_err(|e| exchange_error("profile request failed", e))?;
                let user: FacebookUser = Self::read_json(response, "profile lookup failed").await?;
                // Graph does not report whether the address was confirmed.
                OAuthProfile {
                    provider,
                    provider_id: user.id,
                    email: user.email,
                    name: user.name,
                    email_verified: false,
                }
            }
        };

        tracing::info!(provider = %provider, "Fetched OAuth profile");
        Ok(profile)
    }
}
