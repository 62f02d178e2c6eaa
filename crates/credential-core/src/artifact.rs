//! On-disk formats
//!
//! `.creds` artifact, one base64 triple per credential:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "createdAt": "2026-01-01T00:00:00Z",
//!   "credentials": {
//!     "API_KEY": { "data": "...", "nonce": "...", "tag": "..." }
//!   }
//! }
//! ```
//!
//! External key file: `{"version": "1.0", "algorithm": "AES-256-GCM", "key": "..."}`

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{EncryptedCredential, MasterKey};
use crate::error::{CredentialError, Result};
use crate::key::{is_valid_key_name, CredentialKey};
use crate::persist::{write_atomic, Visibility};

/// Artifact and key file format version
pub const FORMAT_VERSION: &str = "1.0";

/// Only supported cipher
pub const ALGORITHM: &str = "AES-256-GCM";

/// Base64 fields of one sealed credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Ciphertext
    pub data: String,
    pub nonce: String,
    pub tag: String,
}

impl ArtifactEntry {
    pub fn encode(encrypted: &EncryptedCredential) -> Self {
        Self {
            data: BASE64.encode(&encrypted.ciphertext),
            nonce: BASE64.encode(encrypted.nonce),
            tag: BASE64.encode(encrypted.tag),
        }
    }

    pub fn decode(&self) -> Result<EncryptedCredential> {
        let field = |name: &str, value: &str| {
            BASE64.decode(value).map_err(|e| {
                CredentialError::InvalidArtifact(format!("Invalid {} base64: {}", name, e))
            })
        };

        EncryptedCredential::from_parts(
            field("data", &self.data)?,
            &field("nonce", &self.nonce)?,
            &field("tag", &self.tag)?,
        )
    }
}

/// Contents of a `.creds` file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialArtifact {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Keyed by credential name; BTreeMap keeps output sorted
    pub credentials: BTreeMap<String, ArtifactEntry>,
}

impl Default for CredentialArtifact {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialArtifact {
    /// Empty artifact stamped with the current time
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            created_at: Some(Utc::now()),
            credentials: BTreeMap::new(),
        }
    }

    /// Add or replace an entry
    pub fn insert(&mut self, key: CredentialKey, encrypted: &EncryptedCredential) {
        self.credentials
            .insert(key.as_str().to_string(), ArtifactEntry::encode(encrypted));
    }

    /// Parse and check the version
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;

        if artifact.version != FORMAT_VERSION {
            return Err(CredentialError::InvalidArtifact(format!(
                "Unsupported version: {}",
                artifact.version
            )));
        }

        Ok(artifact)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode every entry for a known slot
    ///
    /// Names outside the closed key set are skipped so that artifacts written
    /// for a larger set still load. Malformed names or entries are rejected.
    pub fn entries(&self) -> Result<BTreeMap<CredentialKey, EncryptedCredential>> {
        let mut entries = BTreeMap::new();

        for (name, entry) in &self.credentials {
            if !is_valid_key_name(name) {
                return Err(CredentialError::InvalidArtifact(format!(
                    "Invalid credential name: {}",
                    name
                )));
            }

            let key = match name.parse::<CredentialKey>() {
                Ok(key) => key,
                Err(_) => {
                    warn!("Skipping unknown credential {} in artifact", name);
                    continue;
                }
            };

            let encrypted = entry.decode().map_err(|e| match e {
                CredentialError::InvalidArtifact(msg) => {
                    CredentialError::InvalidArtifact(format!("{}: {}", name, msg))
                }
                other => other,
            })?;

            entries.insert(key, encrypted);
        }

        Ok(entries)
    }

    /// Load from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let artifact = Self::from_json(&contents)?;

        debug!("Loaded {} credentials from {:?}", artifact.credentials.len(), path);
        Ok(artifact)
    }

    /// Save to a file, atomically via a temp file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_json()?;
        write_atomic(path, contents.as_bytes(), Visibility::Shared).await?;

        debug!("Saved {} credentials to {:?}", self.credentials.len(), path);
        Ok(())
    }
}

/// External key file document
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyFile {
    pub version: String,
    pub algorithm: String,
    /// Base64 master key
    pub key: String,
}

impl KeyFile {
    pub fn new(key: &MasterKey) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            algorithm: ALGORITHM.to_string(),
            key: key.to_base64().as_str().to_owned(),
        }
    }

    /// Parse; any failure means the key is unavailable
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|_| CredentialError::MasterKeyUnavailable("malformed key file".to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode the key after checking algorithm and version
    pub fn master_key(&self) -> Result<MasterKey> {
        if self.algorithm != ALGORITHM {
            return Err(CredentialError::MasterKeyUnavailable(format!(
                "unsupported algorithm: {}",
                self.algorithm
            )));
        }
        if self.version != FORMAT_VERSION {
            return Err(CredentialError::MasterKeyUnavailable(format!(
                "unsupported key file version: {}",
                self.version
            )));
        }

        MasterKey::from_base64(&self.key)
    }
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.key);
    }
}

impl std::fmt::Debug for KeyFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFile")
            .field("version", &self.version)
            .field("algorithm", &self.algorithm)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Write a key file for `key`, atomically and readable by the owner only
pub async fn write_key_file(path: &Path, key: &MasterKey) -> Result<()> {
    let contents = Zeroizing::new(KeyFile::new(key).to_json()?);
    write_atomic(path, contents.as_bytes(), Visibility::OwnerOnly).await?;

    debug!("Wrote key file to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{open_string, seal_string};
    use tempfile::TempDir;

    fn sample() -> (CredentialArtifact, MasterKey) {
        let key = MasterKey::generate();
        let mut artifact = CredentialArtifact::new();
        artifact.insert(CredentialKey::ApiKey, &seal_string("sk-12345", &key).unwrap());
        artifact.insert(
            CredentialKey::DatabaseUrl,
            &seal_string("postgres://localhost/app", &key).unwrap(),
        );
        (artifact, key)
    }

    #[test]
    fn test_json_layout() {
        let (artifact, _) = sample();
        let value: serde_json::Value = serde_json::from_str(&artifact.to_json().unwrap()).unwrap();

        assert_eq!(value["version"], "1.0");
        assert!(value["createdAt"].is_string());
        let entry = &value["credentials"]["API_KEY"];
        assert!(entry["data"].is_string());
        assert!(entry["nonce"].is_string());
        assert!(entry["tag"].is_string());
    }

    #[test]
    fn test_entries_decrypt() {
        let (artifact, key) = sample();
        let parsed = CredentialArtifact::from_json(&artifact.to_json().unwrap()).unwrap();
        let entries = parsed.entries().unwrap();

        assert_eq!(entries.len(), 2);
        let api_key = open_string(&entries[&CredentialKey::ApiKey], &key).unwrap();
        assert_eq!(api_key.expose(), "sk-12345");
    }

    #[test]
    fn test_minimal_artifact_without_timestamp() {
        let json = r#"{"version": "1.0", "credentials": {}}"#;
        let artifact = CredentialArtifact::from_json(json).unwrap();

        assert!(artifact.created_at.is_none());
        assert!(artifact.entries().unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{"version": "2.0", "credentials": {}}"#;
        assert!(matches!(
            CredentialArtifact::from_json(json),
            Err(CredentialError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_missing_credentials_field() {
        assert!(matches!(
            CredentialArtifact::from_json(r#"{"version": "1.0"}"#),
            Err(CredentialError::SerializationError(_))
        ));
    }

    #[test]
    fn test_unknown_names_are_skipped() {
        let (mut artifact, _) = sample();
        let entry = artifact.credentials["API_KEY"].clone();
        artifact.credentials.insert("SLACK_TOKEN".to_string(), entry);

        let entries = artifact.entries().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let (mut artifact, _) = sample();
        let entry = artifact.credentials["API_KEY"].clone();
        artifact.credentials.insert("api-key".to_string(), entry);

        assert!(matches!(
            artifact.entries(),
            Err(CredentialError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_bad_entry_fields() {
        let (mut artifact, _) = sample();
        artifact.credentials.get_mut("API_KEY").unwrap().nonce = BASE64.encode([0u8; 8]);
        assert!(matches!(
            artifact.entries(),
            Err(CredentialError::InvalidArtifact(msg)) if msg.starts_with("API_KEY")
        ));

        let (mut artifact, _) = sample();
        artifact.credentials.get_mut("API_KEY").unwrap().data = "***".to_string();
        assert!(matches!(
            artifact.entries(),
            Err(CredentialError::InvalidArtifact(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("credentials.creds");
        let (artifact, key) = sample();

        artifact.save(&path).await.unwrap();
        assert!(!crate::persist::temp_path_for(&path).exists());

        let loaded = CredentialArtifact::load(&path).await.unwrap();
        assert_eq!(loaded.credentials, artifact.credentials);

        let entries = loaded.entries().unwrap();
        let url = open_string(&entries[&CredentialKey::DatabaseUrl], &key).unwrap();
        assert_eq!(url.expose(), "postgres://localhost/app");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = CredentialArtifact::load(&temp_dir.path().join("missing.creds")).await;

        assert!(matches!(result, Err(CredentialError::IoError(_))));
    }

    #[tokio::test]
    async fn test_write_key_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credential-key.json");
        let key = MasterKey::generate();

        write_key_file(&path, &key).await.unwrap();
        assert!(!crate::persist::temp_path_for(&path).exists());

        let contents = std::fs::read_to_string(&path).unwrap();
        let key_file = KeyFile::from_json(&contents).unwrap();
        assert_eq!(key_file.algorithm, "AES-256-GCM");
        assert_eq!(key_file.master_key().unwrap().as_bytes(), key.as_bytes());
    }

    #[tokio::test]
    async fn test_write_key_file_into_new_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".credential-code").join("credential-key.json");
        let key = MasterKey::generate();

        write_key_file(&path, &key).await.unwrap();

        let key_file = KeyFile::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(key_file.master_key().unwrap().as_bytes(), key.as_bytes());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_artifact_and_config_saves_do_not_share_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let creds_path = temp_dir.path().join("credentials.creds");
        let json_path = temp_dir.path().join("credentials.json");
        let (artifact, _) = sample();

        let (a, b) = tokio::join!(artifact.save(&creds_path), artifact.save(&json_path));
        a.unwrap();
        b.unwrap();

        assert_eq!(
            CredentialArtifact::load(&creds_path).await.unwrap().credentials,
            artifact.credentials
        );
        assert_eq!(
            CredentialArtifact::load(&json_path).await.unwrap().credentials,
            artifact.credentials
        );
    }

    #[test]
    fn test_key_file_debug_redacted() {
        let key_file = KeyFile::new(&MasterKey::generate());
        assert!(!format!("{:?}", key_file).contains(&key_file.key));
    }
}
