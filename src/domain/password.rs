use anyhow::Result;

/// Password hashing and verification
pub trait PasswordHashingService: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String>;
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool>;
}
