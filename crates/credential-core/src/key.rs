//! Credential slot identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CredentialError, Result};

/// Named credential slot
///
/// The set is closed: artifacts may only carry credentials for these slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialKey {
    ApiKey,
    AwsSecretKey,
    DatabasePassword,
    DatabaseUrl,
    JwtSecret,
    StripeKey,
}

impl CredentialKey {
    /// Every slot, in name order
    pub const ALL: [CredentialKey; 6] = [
        Self::ApiKey,
        Self::AwsSecretKey,
        Self::DatabasePassword,
        Self::DatabaseUrl,
        Self::JwtSecret,
        Self::StripeKey,
    ];

    /// Canonical name as used in artifacts (e.g. `API_KEY`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "API_KEY",
            Self::AwsSecretKey => "AWS_SECRET_KEY",
            Self::DatabasePassword => "DATABASE_PASSWORD",
            Self::DatabaseUrl => "DATABASE_URL",
            Self::JwtSecret => "JWT_SECRET",
            Self::StripeKey => "STRIPE_KEY",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKey {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self> {
        if !is_valid_key_name(s) {
            return Err(CredentialError::InvalidKeyName(s.to_string()));
        }

        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CredentialError::KeyNotFound(s.to_string()))
    }
}

/// Check a credential name against `^[A-Z0-9_]+$`
pub fn is_valid_key_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}
