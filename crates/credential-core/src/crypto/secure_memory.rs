//! Secure memory handling with automatic zeroization

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CredentialError, Result};

/// Length of an AES-256 key in bytes
pub const MASTER_KEY_LEN: usize = 32;

/// Master encryption key - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; MASTER_KEY_LEN],
}

impl MasterKey {
    /// Create a new master key from raw bytes
    pub fn new(key: [u8; MASTER_KEY_LEN]) -> Self {
        Self { key }
    }

    /// Generate a random key from the OS RNG
    pub fn generate() -> Self {
        let mut key = [0u8; MASTER_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.key
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != MASTER_KEY_LEN {
            return None;
        }
        let mut key = [0u8; MASTER_KEY_LEN];
        key.copy_from_slice(slice);
        Some(Self { key })
    }

    /// Decode a standard base64 key, as written to key files and env vars
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(BASE64.decode(encoded.trim()).map_err(|_| {
            CredentialError::MasterKeyUnavailable("key is not valid base64".to_string())
        })?);

        Self::from_slice(&decoded).ok_or_else(|| {
            CredentialError::MasterKeyUnavailable(format!(
                "expected {} key bytes, got {}",
                MASTER_KEY_LEN,
                decoded.len()
            ))
        })
    }

    /// Encode as standard base64
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.key))
    }
}

impl Clone for MasterKey {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted credential value - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Consume and return the inner value
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
