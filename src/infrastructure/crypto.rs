use crate::domain::keys::KeyCipher;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::{Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

/// AES-256-GCM under `SHA-256(master key)`.
///
/// Output is base64 of `nonce || ciphertext`; the nonce is random per call.
#[derive(Clone)]
pub struct AesKeyCipher {
    cipher: Aes256Gcm,
}

impl AesKeyCipher {
    pub fn new(master_key: &str) -> Result<Self> {
        if master_key.is_empty() {
            return Err(anyhow!("MASTER_KEY must not be empty"));
        }

        let digest = Sha256::digest(master_key.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&digest)
            .map_err(|e| anyhow!("Invalid cipher key: {}", e))?;

        Ok(Self { cipher })
    }
}

impl KeyCipher for AesKeyCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("Failed to encrypt key: {}", e))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, encrypted: &str) -> Result<String> {
        let raw = STANDARD
            .decode(encrypted)
            .map_err(|e| anyhow!("Encrypted key is not valid base64: {}", e))?;

        if raw.len() <= NONCE_LEN {
            return Err(anyhow!("Encrypted key is too short"));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| anyhow!("Failed to decrypt key"))?;

        String::from_utf8(plaintext).map_err(|e| anyhow!("Decrypted key is not UTF-8: {}", e))
    }
}
