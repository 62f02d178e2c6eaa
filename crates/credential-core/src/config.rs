//! Store configuration
//!
//! Says where the credentials artifact lives and how the master key is
//! obtained. Holds no secrets, so it is kept in a plain JSON file.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::crypto::{generate_salt, KeyDerivationParams};
use crate::error::Result;
use crate::master_key::{
    EnvKeySource, KeyFileSource, KeychainKeySource, MasterKeySource, PassphraseKeySource,
    DEFAULT_KEY_VAR, DEFAULT_PASSPHRASE_VAR,
};
use crate::persist::{write_atomic, Visibility};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "credential-code.json";

/// Project-local working directory
pub const CREDENTIAL_DIR: &str = ".credential-code";

/// Where to find the master key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum MasterKeyConfig {
    /// Base64 text file or JSON key file
    File { path: PathBuf },
    /// Base64 key in an environment variable
    Env { var: String },
    /// Base64 key in the OS keychain
    Keychain { service: String, user: String },
    /// Passphrase in an environment variable, stretched with Argon2id
    Passphrase {
        var: String,
        /// Base64 salt
        salt: String,
        #[serde(default)]
        kdf: KeyDerivationParams,
    },
}

impl Default for MasterKeyConfig {
    fn default() -> Self {
        Self::File {
            path: Path::new(CREDENTIAL_DIR).join("encryption-key.txt"),
        }
    }
}

impl MasterKeyConfig {
    /// Environment variable source using the default variable
    pub fn default_env() -> Self {
        Self::Env {
            var: DEFAULT_KEY_VAR.to_string(),
        }
    }

    /// Passphrase source with a freshly generated salt and default costs
    pub fn new_passphrase() -> Self {
        Self::Passphrase {
            var: DEFAULT_PASSPHRASE_VAR.to_string(),
            salt: generate_salt(),
            kdf: KeyDerivationParams::default(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Path of the `.creds` artifact
    pub credentials_path: PathBuf,
    /// Master key source
    pub master_key: MasterKeyConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            credentials_path: Path::new(CREDENTIAL_DIR).join("credentials.creds"),
            master_key: MasterKeyConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load from file, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save to file, creating the parent directory if needed
    pub async fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        write_atomic(path, contents.as_bytes(), Visibility::Shared).await?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Per-user config directory for this tool, if the platform has one
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "credential-code", "credential-code")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Per-user config file path, if the platform has a config directory
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Build the configured master key source
    pub fn key_source(&self) -> Arc<dyn MasterKeySource> {
        match &self.master_key {
            MasterKeyConfig::File { path } => Arc::new(KeyFileSource::new(path)),
            MasterKeyConfig::Env { var } => Arc::new(EnvKeySource::new(var.clone())),
            MasterKeyConfig::Keychain { service, user } => {
                Arc::new(KeychainKeySource::new(service.clone(), user.clone()))
            }
            MasterKeyConfig::Passphrase { var, salt, kdf } => Arc::new(PassphraseKeySource::new(
                var.clone(),
                salt.clone(),
                kdf.clone(),
            )),
        }
    }
}
