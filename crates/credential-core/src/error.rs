//! Error types for credential-core

use thiserror::Error;

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Credential error types
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential not found: {0}")]
    KeyNotFound(String),

    /// Deliberately carries no detail: a wrong key, a tampered tag and a
    /// corrupted ciphertext must look the same to the caller.
    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Master key unavailable: {0}")]
    MasterKeyUnavailable(String),

    #[error("Invalid credential key name: {0} (use A-Z, 0-9 and _ only)")]
    InvalidKeyName(String),

    #[error("Credential already exists: {0}")]
    DuplicateKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Invalid credentials artifact: {0}")]
    InvalidArtifact(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CredentialError {
    /// Whether this error came from the decryption step itself
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decryption_failed_has_no_detail() {
        assert_eq!(CredentialError::DecryptionFailed.to_string(), "Decryption failed");
        assert!(CredentialError::DecryptionFailed.is_decryption_failure());
        assert!(!CredentialError::KeyNotFound("API_KEY".into()).is_decryption_failure());
    }
}
