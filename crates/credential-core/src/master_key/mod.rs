//! Master key sources
//!
//! The store never owns key material for longer than one operation; it asks
//! a [`MasterKeySource`] each time. Sources provided here:
//! 1. In-memory key ([`StaticKeySource`])
//! 2. Environment variable ([`EnvKeySource`])
//! 3. Key file, plain base64 or JSON ([`KeyFileSource`])
//! 4. OS keychain ([`KeychainKeySource`])
//! 5. Passphrase stretched with Argon2id ([`PassphraseKeySource`])

mod env;
mod key_file;
mod keychain;
mod passphrase;
mod traits;

pub use env::{EnvKeySource, DEFAULT_KEY_VAR};
pub use key_file::KeyFileSource;
pub use keychain::KeychainKeySource;
pub use passphrase::{PassphraseKeySource, DEFAULT_PASSPHRASE_VAR};
pub use traits::MasterKeySource;

use crate::crypto::MasterKey;
use crate::error::{CredentialError, Result};

/// Holds a key in process memory, zeroed when the source is dropped
#[derive(Debug, Clone)]
pub struct StaticKeySource {
    key: MasterKey,
}

impl StaticKeySource {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }
}

impl MasterKeySource for StaticKeySource {
    fn acquire(&self) -> Result<MasterKey> {
        Ok(self.key.clone())
    }

    fn describe(&self) -> &'static str {
        "in-memory key"
    }
}

/// A source with no key; stores built on it can list but not decrypt
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeySource;

impl MasterKeySource for NoKeySource {
    fn acquire(&self) -> Result<MasterKey> {
        Err(CredentialError::MasterKeyUnavailable(
            "no master key configured".to_string(),
        ))
    }

    fn describe(&self) -> &'static str {
        "none"
    }
}
