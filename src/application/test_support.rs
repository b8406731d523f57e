use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::oauth::OAuthIdentityRepository;
use crate::domain::password::PasswordHashingService;
use crate::domain::users::{NewUser, Role, User, UserRepository};
use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::crypto::AesKeyCipher;
use crate::infrastructure::keys::KeyService;
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::repositories::mock::{
    MockKeyRepository, MockOAuthIdentityRepository, MockRefreshTokenRepository,
    MockUserRepository,
};
use std::sync::Arc;

/// In-memory repositories plus real JWT and password services.
pub struct Harness {
    pub users: Arc<MockUserRepository>,
    pub tokens: Arc<MockRefreshTokenRepository>,
    pub identities: Arc<MockOAuthIdentityRepository>,
    pub auth: Arc<JwtAuthService>,
    pub passwords: Arc<PasswordService>,
}

impl Harness {
    pub fn new() -> Self {
        let keys = Arc::new(KeyService::new(
            Arc::new(MockKeyRepository::new()),
            Arc::new(AesKeyCipher::new("test-master-key").unwrap()),
        ));

        Self {
            users: Arc::new(MockUserRepository::new()),
            tokens: Arc::new(MockRefreshTokenRepository::new()),
            identities: Arc::new(MockOAuthIdentityRepository::new()),
            auth: Arc::new(JwtAuthService::new(keys, 900, 604800)),
            passwords: Arc::new(PasswordService::new()),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    pub fn token_repo(&self) -> Arc<dyn RefreshTokenRepository> {
        self.tokens.clone()
    }

    pub fn identity_repo(&self) -> Arc<dyn OAuthIdentityRepository> {
        self.identities.clone()
    }

    pub fn auth_service(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    pub fn password_service(&self) -> Arc<dyn PasswordHashingService> {
        self.passwords.clone()
    }

    pub async fn seed(&self, email: &str, password: &str, role: Role) -> User {
        self.users
            .create(NewUser {
                name: "Seeded User".to_string(),
                email: email.to_string(),
                password_hash: self.passwords.hash_password(password).unwrap(),
                role,
            })
            .await
            .unwrap()
    }
}
