//! In-memory repositories used by the application tests.

use crate::domain::auth::{NewRefreshToken, RefreshToken, RefreshTokenRepository};
use crate::domain::keys::{KeyRepository, KeyType, NewSigningKey, SigningKey};
use crate::domain::oauth::{OAuthIdentity, OAuthIdentityRepository, OAuthProvider};
use crate::domain::users::{
    DuplicateEmail, NewUser, UpdateUser, User, UserFilter, UserRepository, normalize_email,
};
use crate::shared::pagination::{FindAllQuery, Page, QueryError, SortOrder};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, anyhow::Error> {
    mutex
        .lock()
        .map_err(|_| anyhow::anyhow!("in-memory store poisoned"))
}

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored user, deleted ones included.
    pub fn all(&self) -> Vec<User> {
        self.users.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Insert a user as-is, bypassing the email check.
    pub fn insert(&self, user: User) {
        if let Ok(mut users) = self.users.lock() {
            users.push(user);
        }
    }
}

fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
    users
        .iter()
        .any(|u| u.deleted_at.is_none() && u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error> {
        let mut users = lock(&self.users)?;
        let email = normalize_email(&new_user.email);
        if email_taken(&users, &email, None) {
            return Err(DuplicateEmail.into());
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let users = lock(&self.users)?;
        Ok(users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let users = lock(&self.users)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let email = normalize_email(email);
        let users = lock(&self.users)?;
        Ok(users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn list(
        &self,
        query: &FindAllQuery,
        filter: &UserFilter,
    ) -> Result<Page<User>, anyhow::Error> {
        let users = lock(&self.users)?;
        let include_deleted = filter.allow_with_deleted && query.wants_deleted();
        let term = query.search_term().map(str::to_lowercase);

        let mut matched: Vec<User> = users
            .iter()
            .filter(|u| include_deleted || u.deleted_at.is_none())
            .filter(|u| match &term {
                Some(t) => u.name.to_lowercase().contains(t) || u.email.to_lowercase().contains(t),
                None => true,
            })
            .filter(|u| filter.role.is_none_or(|r| u.role == r))
            .filter(|u| filter.created_after.is_none_or(|t| u.created_at > t))
            .filter(|u| filter.created_before.is_none_or(|t| u.created_at < t))
            .cloned()
            .collect();

        match (query.sort, query.sort_field.as_deref()) {
            (Some(order), Some(field)) => {
                match field {
                    "id" => matched.sort_by_key(|u| u.id),
                    "name" => matched.sort_by(|a, b| a.name.cmp(&b.name)),
                    "email" => matched.sort_by(|a, b| a.email.cmp(&b.email)),
                    "role" => matched.sort_by_key(|u| u.role.as_str()),
                    "createdAt" => matched.sort_by_key(|u| u.created_at),
                    "updatedAt" => matched.sort_by_key(|u| u.updated_at),
                    other => {
                        return Err(QueryError(format!("Invalid sort field: {}", other)).into());
                    }
                }
                if order == SortOrder::Desc {
                    matched.reverse();
                }
            }
            _ => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok(Page::new(items, total, query.page(), query.limit()))
    }

    async fn update(&self, id: Uuid, update: UpdateUser) -> Result<User, anyhow::Error> {
        let mut users = lock(&self.users)?;

        if let Some(email) = &update.email {
            if email_taken(&users, &normalize_email(email), Some(id)) {
                return Err(DuplicateEmail.into());
            }
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or_else(|| anyhow::anyhow!("User {} not found", id))?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = normalize_email(&email);
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = OffsetDateTime::now_utc();

        Ok(user.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let mut users = lock(&self.users)?;
        match users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        {
            Some(user) => {
                user.deleted_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn restore(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let mut users = lock(&self.users)?;

        let email = match users.iter().find(|u| u.id == id && u.deleted_at.is_some()) {
            Some(user) => user.email.clone(),
            None => return Ok(false),
        };
        if email_taken(&users, &email, Some(id)) {
            return Err(DuplicateEmail.into());
        }

        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.deleted_at = None;
        }
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let mut users = lock(&self.users)?;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<Mutex<Vec<RefreshToken>>>,
}

impl MockRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<RefreshToken> {
        self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Flip the active flag of every token matching the hash.
    pub fn set_active(&self, token_hash: &str, active: bool) {
        if let Ok(mut tokens) = self.tokens.lock() {
            for token in tokens.iter_mut().filter(|t| t.token_hash == token_hash) {
                token.is_active = active;
            }
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> anyhow::Result<RefreshToken> {
        let stored = RefreshToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token_hash: token.token_hash,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        lock(&self.tokens)?.push(stored.clone());
        Ok(stored)
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> anyhow::Result<Option<RefreshToken>> {
        let tokens = lock(&self.tokens)?;
        Ok(tokens
            .iter()
            .find(|t| t.user_id == user_id && t.token_hash == token_hash && t.is_active)
            .cloned())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> anyhow::Result<bool> {
        let mut tokens = lock(&self.tokens)?;
        let before = tokens.len();
        tokens.retain(|t| t.token_hash != token_hash);
        Ok(tokens.len() < before)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let mut tokens = lock(&self.tokens)?;
        let before = tokens.len();
        tokens.retain(|t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Clone, Default)]
pub struct MockKeyRepository {
    keys: Arc<Mutex<Vec<SigningKey>>>,
}

impl MockKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<SigningKey> {
        self.keys.lock().map(|k| k.clone()).unwrap_or_default()
    }

    /// Store a key with an explicit creation time.
    pub fn insert(&self, key: SigningKey) {
        if let Ok(mut keys) = self.keys.lock() {
            keys.push(key);
        }
    }
}

#[async_trait]
impl KeyRepository for MockKeyRepository {
    async fn create(&self, key: NewSigningKey) -> anyhow::Result<SigningKey> {
        let stored = SigningKey {
            id: Uuid::new_v4(),
            encrypted_key: key.encrypted_key,
            key_type: key.key_type,
            created_at: OffsetDateTime::now_utc(),
        };
        lock(&self.keys)?.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SigningKey>> {
        Ok(lock(&self.keys)?.iter().find(|k| k.id == id).cloned())
    }

    async fn find_latest(&self, key_type: KeyType) -> anyhow::Result<Option<SigningKey>> {
        Ok(lock(&self.keys)?
            .iter()
            .filter(|k| k.key_type == key_type)
            .max_by_key(|k| k.created_at)
            .cloned())
    }

    async fn delete_older_than(
        &self,
        key_type: KeyType,
        cutoff: OffsetDateTime,
    ) -> anyhow::Result<u64> {
        let mut keys = lock(&self.keys)?;
        let before = keys.len();
        keys.retain(|k| !(k.key_type == key_type && k.created_at < cutoff));
        Ok((before - keys.len()) as u64)
    }
}


#[derive(Clone, Default)]
pub struct MockOAuthIdentityRepository {
    identities: Arc<Mutex<Vec<OAuthIdentity>>>,
}

impl MockOAuthIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<OAuthIdentity> {
        self.identities.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OAuthIdentityRepository for MockOAuthIdentityRepository {
    async fn find(
        &self,
        provider: OAuthProvider,
        subject: &str,
    ) -> anyhow::Result<Option<OAuthIdentity>> {
        let identities = lock(&self.identities)?;
        Ok(identities
            .iter()
            .find(|i| i.provider == provider && i.subject == subject)
            .cloned())
    }

    async fn link(&self, identity: OAuthIdentity) -> anyhow::Result<()> {
        let mut identities = lock(&self.identities)?;
        if identities
            .iter()
            .any(|i| i.provider == identity.provider && i.subject == identity.subject)
        {
            anyhow::bail!("OAuth identity already linked");
        }
        identities.push(identity);
        Ok(())
    }

    async fn delete_unverified_for_user(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let mut identities = lock(&self.identities)?;
        let before = identities.len();
        identities.retain(|i| i.user_id != user_id || i.email_verified);
        Ok((before - identities.len()) as u64)
    }
}
