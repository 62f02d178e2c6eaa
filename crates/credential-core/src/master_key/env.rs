//! Master key from an environment variable

use tracing::debug;
use zeroize::Zeroizing;

use super::MasterKeySource;
use crate::crypto::MasterKey;
use crate::error::{CredentialError, Result};

/// Default variable holding the base64 master key
pub const DEFAULT_KEY_VAR: &str = "CREDENTIAL_CODE_KEY";

/// Reads a base64 key from an environment variable on every acquisition
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    /// Use a specific variable name
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Variable this source reads
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_VAR)
    }
}

impl MasterKeySource for EnvKeySource {
    fn acquire(&self) -> Result<MasterKey> {
        let encoded = Zeroizing::new(std::env::var(&self.var).map_err(|_| {
            CredentialError::MasterKeyUnavailable(format!(
                "environment variable {} is not set",
                self.var
            ))
        })?);

        debug!("Read master key from environment variable {}", self.var);
        MasterKey::from_base64(&encoded)
    }

    fn describe(&self) -> &'static str {
        "environment variable"
    }
}
