//! # credential-core
//!
//! Local encrypted-credential store with decrypt-on-access:
//! - AES-256-GCM sealed values, one random nonce per credential
//! - Closed set of credential slots ([`CredentialKey`])
//! - Pluggable master key sources (env, key file, OS keychain, passphrase)
//! - Zeroize-on-drop for master keys and decrypted values
//!
//! ```no_run
//! use credential_core::{CredentialKey, CredentialStore, StoreConfig};
//!
//! # async fn run() -> credential_core::Result<()> {
//! let store = CredentialStore::open(&StoreConfig::default()).await?;
//! let api_key = store.decrypt(CredentialKey::ApiKey)?;
//! println!("{} chars", api_key.expose().len());
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod key;
pub mod master_key;
mod persist;
mod store;

pub use artifact::{CredentialArtifact, KeyFile};
pub use cache::CachedCredentials;
pub use config::{MasterKeyConfig, StoreConfig};
pub use crypto::{EncryptedCredential, MasterKey, SecretString};
pub use error::{CredentialError, Result};
pub use key::CredentialKey;
pub use master_key::{
    EnvKeySource, KeyFileSource, KeychainKeySource, MasterKeySource, NoKeySource,
    PassphraseKeySource, StaticKeySource,
};
pub use store::{CredentialStore, CredentialStoreBuilder};
