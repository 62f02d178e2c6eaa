//! Cryptographic primitives for sealed credentials
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption
//! - Argon2id master key derivation from passphrases (see `PassphraseKeySource`)
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{
    open, open_string, seal, seal_string, EncryptedCredential, NONCE_LEN, TAG_LEN,
};
pub use key_derivation::{derive_master_key, generate_salt, KeyDerivationParams, SALT_LEN};
pub use secure_memory::{MasterKey, SecretString, MASTER_KEY_LEN};
