//! Read-only credential store with decrypt-on-access

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::artifact::CredentialArtifact;
use crate::config::StoreConfig;
use crate::crypto::{open_string, seal_string, EncryptedCredential, MasterKey, SecretString};
use crate::error::{CredentialError, Result};
use crate::key::CredentialKey;
use crate::master_key::MasterKeySource;

/// Sealed credentials plus the source of the key that opens them
///
/// Immutable once built; share it behind an `Arc` for concurrent readers.
pub struct CredentialStore {
    entries: HashMap<CredentialKey, EncryptedCredential>,
    key_source: Arc<dyn MasterKeySource>,
}

impl CredentialStore {
    /// Start an empty builder
    pub fn builder() -> CredentialStoreBuilder {
        CredentialStoreBuilder::new()
    }

    /// Load the configured artifact and wire up the configured key source
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let artifact = CredentialArtifact::load(&config.credentials_path).await?;
        let source = config.key_source();

        info!(
            "Opened credential store {:?} using {}",
            config.credentials_path,
            source.describe()
        );
        Ok(CredentialStoreBuilder::from_artifact(&artifact)?.build_with(source))
    }

    /// Decrypt one credential
    ///
    /// The key is looked up before the master key is acquired, so an absent
    /// credential is reported as `KeyNotFound` whatever the key source state.
    pub fn decrypt(&self, key: CredentialKey) -> Result<SecretString> {
        let encrypted = self
            .entries
            .get(&key)
            .ok_or_else(|| CredentialError::KeyNotFound(key.to_string()))?;

        let master_key = self.key_source.acquire()?;
        let plaintext = open_string(encrypted, &master_key)?;

        debug!("Decrypted credential: {}", key);
        Ok(plaintext)
    }

    /// Decrypt by textual name (e.g. `"API_KEY"`)
    pub fn decrypt_by_name(&self, name: &str) -> Result<SecretString> {
        self.decrypt(name.parse()?)
    }

    /// Decrypt every credential under a single key acquisition
    ///
    /// All-or-nothing: the first failure is returned and nothing else.
    pub fn decrypt_all(&self) -> Result<BTreeMap<CredentialKey, SecretString>> {
        let master_key = self.key_source.acquire()?;

        let decrypted = self
            .entries
            .iter()
            .map(|(key, encrypted)| -> Result<(CredentialKey, SecretString)> {
                Ok((*key, open_string(encrypted, &master_key)?))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        debug!("Decrypted {} credentials", decrypted.len());
        Ok(decrypted)
    }

    pub fn contains(&self, key: CredentialKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<CredentialKey> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sealed value for a key, if present
    pub fn encrypted(&self, key: CredentialKey) -> Option<&EncryptedCredential> {
        self.entries.get(&key)
    }

    /// Describe the key source in use
    pub fn key_source(&self) -> &'static str {
        self.key_source.describe()
    }

    /// Snapshot the sealed values as a fresh artifact
    pub fn to_artifact(&self) -> CredentialArtifact {
        let mut artifact = CredentialArtifact::new();
        for (key, encrypted) in &self.entries {
            artifact.insert(*key, encrypted);
        }
        artifact
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("keys", &self.keys())
            .field("key_source", &self.key_source.describe())
            .finish()
    }
}

/// Mutable staging area for a [`CredentialStore`]
#[derive(Debug, Default)]
pub struct CredentialStoreBuilder {
    entries: HashMap<CredentialKey, EncryptedCredential>,
}

impl CredentialStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a parsed artifact
    pub fn from_artifact(artifact: &CredentialArtifact) -> Result<Self> {
        Ok(Self {
            entries: artifact.entries()?.into_iter().collect(),
        })
    }

    /// Insert or replace an already sealed value
    pub fn insert(&mut self, key: CredentialKey, encrypted: EncryptedCredential) -> &mut Self {
        self.entries.insert(key, encrypted);
        self
    }

    /// Seal a plaintext under `master_key` and insert or replace it
    pub fn seal(
        &mut self,
        key: CredentialKey,
        plaintext: &str,
        master_key: &MasterKey,
    ) -> Result<&mut Self> {
        let encrypted = seal_string(plaintext, master_key)?;
        Ok(self.insert(key, encrypted))
    }

    /// Seal and insert; an existing key is only replaced when `force` is set
    pub fn add(
        &mut self,
        key: CredentialKey,
        plaintext: &str,
        master_key: &MasterKey,
        force: bool,
    ) -> Result<&mut Self> {
        if !force && self.entries.contains_key(&key) {
            return Err(CredentialError::DuplicateKey(key.to_string()));
        }

        self.seal(key, plaintext, master_key)?;
        info!("Added credential: {}", key);
        Ok(self)
    }

    /// Remove a credential
    pub fn remove(&mut self, key: CredentialKey) -> Result<()> {
        self.entries
            .remove(&key)
            .map(|_| info!("Removed credential: {}", key))
            .ok_or_else(|| CredentialError::KeyNotFound(key.to_string()))
    }

    pub fn contains(&self, key: CredentialKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Freeze into a store that decrypts with `source`
    pub fn build(self, source: impl MasterKeySource + 'static) -> CredentialStore {
        self.build_with(Arc::new(source))
    }

    /// Freeze into a store sharing an existing source
    pub fn build_with(self, source: Arc<dyn MasterKeySource>) -> CredentialStore {
        debug!("Built credential store with {} entries", self.entries.len());

        CredentialStore {
            entries: self.entries,
            key_source: source,
        }
    }
}
