//! Master key derivation from a passphrase (Argon2id)

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::{MasterKey, MASTER_KEY_LEN};
use crate::error::{CredentialError, Result};

/// Random salt length in bytes
pub const SALT_LEN: usize = 16;

/// Argon2id cost settings, stored alongside the salt in config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyDerivationParams {
    /// KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 64 * 1024,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(MASTER_KEY_LEN),
        )
        .map_err(|e| CredentialError::KeyDerivationError(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Fresh random salt, base64 encoded for config files
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    BASE64.encode(salt)
}

/// Stretch a passphrase into a master key
///
/// Deterministic for a given passphrase, salt and params.
pub fn derive_master_key(
    passphrase: &str,
    salt: &str,
    params: &KeyDerivationParams,
) -> Result<MasterKey> {
    let salt = BASE64
        .decode(salt.trim())
        .map_err(|e| CredentialError::KeyDerivationError(format!("Invalid salt: {}", e)))?;

    let mut output = [0u8; MASTER_KEY_LEN];
    let derived = params
        .hasher()?
        .hash_password_into(passphrase.as_bytes(), &salt, &mut output)
        .map_err(|e| CredentialError::KeyDerivationError(e.to_string()))
        .map(|()| MasterKey::new(output));

    output.zeroize();
    derived
}
