//! Master key from the OS keychain
//!
//! Uses the system keychain:
//! - macOS: Keychain
//! - Windows: Credential Manager (DPAPI)
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::debug;
use zeroize::Zeroizing;

use super::MasterKeySource;
use crate::crypto::MasterKey;
use crate::error::{CredentialError, Result};

/// Default keychain service name
pub const DEFAULT_SERVICE: &str = "credential-code";

/// Default keychain account name
pub const DEFAULT_USER: &str = "master-key";

/// Reads a base64 key from a keychain entry on every acquisition
#[derive(Debug, Clone)]
pub struct KeychainKeySource {
    service: String,
    user: String,
}

impl KeychainKeySource {
    pub fn new(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.user)
            .map_err(|e| CredentialError::MasterKeyUnavailable(format!("keychain: {}", e)))
    }
}

impl Default for KeychainKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE, DEFAULT_USER)
    }
}

impl MasterKeySource for KeychainKeySource {
    fn acquire(&self) -> Result<MasterKey> {
        let encoded = match self.entry()?.get_password() {
            Ok(encoded) => Zeroizing::new(encoded),
            Err(keyring::Error::NoEntry) => {
                return Err(CredentialError::MasterKeyUnavailable(format!(
                    "no keychain entry for {}/{}",
                    self.service, self.user
                )));
            }
            Err(e) => {
                return Err(CredentialError::MasterKeyUnavailable(format!("keychain: {}", e)));
            }
        };

        debug!("Read master key from keychain entry {}/{}", self.service, self.user);
        MasterKey::from_base64(&encoded)
    }

    fn describe(&self) -> &'static str {
        "OS keychain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_is_unavailable() {
        let source = KeychainKeySource::new(DEFAULT_SERVICE, "credential-core-test-missing-entry");

        assert!(matches!(
            source.acquire(),
            Err(CredentialError::MasterKeyUnavailable(_))
        ));
    }

    #[test]
    fn test_describe() {
        assert_eq!(KeychainKeySource::default().describe(), "OS keychain");
    }
}
