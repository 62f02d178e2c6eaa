//! Master key stretched from a passphrase held in an environment variable

use tracing::debug;
use zeroize::Zeroizing;

use super::MasterKeySource;
use crate::crypto::{derive_master_key, KeyDerivationParams, MasterKey};
use crate::error::{CredentialError, Result};

/// Default variable holding the passphrase
pub const DEFAULT_PASSPHRASE_VAR: &str = "CREDENTIAL_CODE_PASSPHRASE";

/// Runs Argon2id over the passphrase on every acquisition
///
/// Each acquisition pays the full derivation cost; prefer
/// [`CredentialStore::decrypt_all`](crate::CredentialStore::decrypt_all) or
/// [`CachedCredentials`](crate::CachedCredentials) when reading many values.
#[derive(Debug, Clone)]
pub struct PassphraseKeySource {
    var: String,
    salt: String,
    params: KeyDerivationParams,
}

impl PassphraseKeySource {
    pub fn new(
        var: impl Into<String>,
        salt: impl Into<String>,
        params: KeyDerivationParams,
    ) -> Self {
        Self {
            var: var.into(),
            salt: salt.into(),
            params,
        }
    }
}

impl MasterKeySource for PassphraseKeySource {
    fn acquire(&self) -> Result<MasterKey> {
        let passphrase = Zeroizing::new(std::env::var(&self.var).map_err(|_| {
            CredentialError::MasterKeyUnavailable(format!(
                "environment variable {} is not set",
                self.var
            ))
        })?);

        let key = derive_master_key(&passphrase, &self.salt, &self.params).map_err(|e| {
            CredentialError::MasterKeyUnavailable(format!("cannot derive key: {}", e))
        })?;

        debug!("Derived master key from passphrase in {}", self.var);
        Ok(key)
    }

    fn describe(&self) -> &'static str {
        "passphrase"
    }
}
