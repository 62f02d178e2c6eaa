//! Decrypt-once cache in front of a [`CredentialStore`]

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::crypto::SecretString;
use crate::error::Result;
use crate::key::CredentialKey;
use crate::store::CredentialStore;

/// Keeps decrypted values in memory after first access
///
/// Only successful decryptions are cached. Cached plaintext is zeroed when
/// [`clear`](Self::clear) is called or the cache is dropped.
pub struct CachedCredentials {
    store: Arc<CredentialStore>,
    cache: RwLock<HashMap<CredentialKey, SecretString>>,
}

impl CachedCredentials {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Cached value, decrypting through the store on a miss
    pub fn get(&self, key: CredentialKey) -> Result<SecretString> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = cache.get(&key) {
                return Ok(value.clone());
            }
        }

        let value = self.store.decrypt(key)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let cached = cache.entry(key).or_insert(value);
        debug!("Cached credential: {}", key);
        Ok(cached.clone())
    }

    /// Drop every cached plaintext
    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let count = cache.len();
        cache.clear();
        debug!("Cleared {} cached credentials", count);
    }

    /// Number of plaintexts currently held
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }
}

impl std::fmt::Debug for CachedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCredentials")
            .field("store", &self.store)
            .field("cached", &self.cached_len())
            .finish()
    }
}
