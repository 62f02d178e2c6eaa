//! Master key from a file on disk
//!
//! Two layouts are accepted:
//! - a text file holding only the base64 key
//! - the external key JSON document (see [`KeyFile`])

use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

use super::MasterKeySource;
use crate::artifact::KeyFile;
use crate::crypto::MasterKey;
use crate::error::{CredentialError, Result};

/// Reads the master key from a file on every acquisition
#[derive(Debug, Clone)]
pub struct KeyFileSource {
    path: PathBuf,
}

impl KeyFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MasterKeySource for KeyFileSource {
    fn acquire(&self) -> Result<MasterKey> {
        let contents = Zeroizing::new(std::fs::read_to_string(&self.path).map_err(|e| {
            CredentialError::MasterKeyUnavailable(format!(
                "cannot read key file {:?}: {}",
                self.path,
                e.kind()
            ))
        })?);

        let key = if contents.trim_start().starts_with('{') {
            KeyFile::from_json(&contents)?.master_key()?
        } else {
            MasterKey::from_base64(&contents)?
        };

        debug!("Read master key from {:?}", self.path);
        Ok(key)
    }

    fn describe(&self) -> &'static str {
        "key file"
    }
}
