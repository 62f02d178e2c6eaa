//! AES-256-GCM authenticated encryption
//!
//! Each credential is sealed under its own random nonce:
//! - Nonce: 12 bytes (96 bits) - standard for GCM
//! - Auth tag: 16 bytes (128 bits)
//! - Ciphertext: same length as the plaintext

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use super::{MasterKey, SecretString};
use crate::error::{CredentialError, Result};

/// Nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// A sealed credential value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedCredential {
    /// Encrypted bytes (without the tag)
    pub ciphertext: Vec<u8>,
    /// Nonce used for this value only
    pub nonce: [u8; NONCE_LEN],
    /// GCM authentication tag
    pub tag: [u8; TAG_LEN],
}

impl EncryptedCredential {
    /// Assemble from raw parts, checking nonce and tag lengths
    pub fn from_parts(ciphertext: Vec<u8>, nonce: &[u8], tag: &[u8]) -> Result<Self> {
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| {
            CredentialError::InvalidArtifact(format!(
                "Invalid nonce length: expected {}, got {}",
                NONCE_LEN,
                nonce.len()
            ))
        })?;
        let tag: [u8; TAG_LEN] = tag.try_into().map_err(|_| {
            CredentialError::InvalidArtifact(format!(
                "Invalid auth tag length: expected {}, got {}",
                TAG_LEN,
                tag.len()
            ))
        })?;

        Ok(Self {
            ciphertext,
            nonce,
            tag,
        })
    }
}

/// Encrypt plaintext using AES-256-GCM under a fresh random nonce
pub fn seal(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedCredential> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CredentialError::EncryptionFailed(e.to_string()))?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    // aes-gcm appends the auth tag to the ciphertext
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CredentialError::EncryptionFailed(e.to_string()))?;

    if sealed.len() < TAG_LEN {
        return Err(CredentialError::EncryptionFailed(
            "Ciphertext too short".to_string(),
        ));
    }

    let tag_start = sealed.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);

    Ok(EncryptedCredential {
        ciphertext: sealed,
        nonce,
        tag,
    })
}

/// Decrypt and authenticate a sealed credential
///
/// The tag is verified before any plaintext is returned. All failures collapse
/// into [`CredentialError::DecryptionFailed`].
pub fn open(encrypted: &EncryptedCredential, key: &MasterKey) -> Result<Zeroizing<Vec<u8>>> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CredentialError::DecryptionFailed)?;

    let mut with_tag = Vec::with_capacity(encrypted.ciphertext.len() + TAG_LEN);
    with_tag.extend_from_slice(&encrypted.ciphertext);
    with_tag.extend_from_slice(&encrypted.tag);

    cipher
        .decrypt(Nonce::from_slice(&encrypted.nonce), with_tag.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| CredentialError::DecryptionFailed)
}

/// Seal a UTF-8 string
pub fn seal_string(plaintext: &str, key: &MasterKey) -> Result<EncryptedCredential> {
    seal(plaintext.as_bytes(), key)
}

/// Open a sealed value as a UTF-8 secret
pub fn open_string(encrypted: &EncryptedCredential, key: &MasterKey) -> Result<SecretString> {
    let mut plaintext = open(encrypted, key)?;
    let bytes = std::mem::take(&mut *plaintext);

    String::from_utf8(bytes)
        .map(SecretString::new)
        .map_err(|e| {
            // drop the rejected bytes zeroed
            drop(Zeroizing::new(e.into_bytes()));
            CredentialError::DecryptionFailed
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_string() {
        let key = MasterKey::generate();

        let encrypted = seal_string("sk-proj-abc123xyz789", &key).unwrap();
        let decrypted = open_string(&encrypted, &key).unwrap();

        assert_eq!(decrypted.expose(), "sk-proj-abc123xyz789");
        assert_eq!(encrypted.ciphertext.len(), "sk-proj-abc123xyz789".len());
    }

    #[test]
    fn test_empty_plaintext() {
        let key = MasterKey::generate();

        let encrypted = seal(b"", &key).unwrap();
        assert!(encrypted.ciphertext.is_empty());
        assert_eq!(open(&encrypted, &key).unwrap().as_slice(), b"");
    }

    #[test]
    fn test_different_nonces_produce_different_ciphertext() {
        let key = MasterKey::generate();
        let plaintext = b"same plaintext";

        let encrypted1 = seal(plaintext, &key).unwrap();
        let encrypted2 = seal(plaintext, &key).unwrap();

        assert_ne!(encrypted1.nonce, encrypted2.nonce);
        assert_ne!(encrypted1.ciphertext, encrypted2.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let encrypted = seal(b"secret data", &MasterKey::generate()).unwrap();
        let result = open(&encrypted, &MasterKey::generate());

        assert!(matches!(result, Err(CredentialError::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails_decryption() {
        let key = MasterKey::generate();

        let mut encrypted = seal(b"secret data", &key).unwrap();
        encrypted.ciphertext[0] ^= 0x01;

        assert!(matches!(open(&encrypted, &key), Err(CredentialError::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_tag_and_nonce_fail_decryption() {
        let key = MasterKey::generate();
        let encrypted = seal(b"secret data", &key).unwrap();

        let mut bad_tag = encrypted.clone();
        bad_tag.tag[15] ^= 0x80;
        assert!(matches!(open(&bad_tag, &key), Err(CredentialError::DecryptionFailed)));

        let mut bad_nonce = encrypted;
        bad_nonce.nonce[0] ^= 0x01;
        assert!(matches!(open(&bad_nonce, &key), Err(CredentialError::DecryptionFailed)));
    }

    #[test]
    fn test_truncated_ciphertext_fails_decryption() {
        let key = MasterKey::generate();

        let mut encrypted = seal(b"secret data", &key).unwrap();
        encrypted.ciphertext.pop();

        assert!(matches!(open(&encrypted, &key), Err(CredentialError::DecryptionFailed)));
    }

    #[test]
    fn test_non_utf8_plaintext_is_decryption_failure() {
        let key = MasterKey::generate();
        let encrypted = seal(&[0xff, 0xfe, 0xfd], &key).unwrap();

        assert!(open(&encrypted, &key).is_ok());
        assert!(matches!(
            open_string(&encrypted, &key),
            Err(CredentialError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_from_parts_checks_lengths() {
        assert!(EncryptedCredential::from_parts(vec![1, 2], &[0u8; 12], &[0u8; 16]).is_ok());
        assert!(matches!(
            EncryptedCredential::from_parts(vec![1, 2], &[0u8; 8], &[0u8; 16]),
            Err(CredentialError::InvalidArtifact(_))
        ));
        assert!(matches!(
            EncryptedCredential::from_parts(vec![1, 2], &[0u8; 12], &[0u8; 15]),
            Err(CredentialError::InvalidArtifact(_))
        ));
    }
}
