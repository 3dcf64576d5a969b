//! Salted hashing of access keys

use hmac::{Hmac, Mac};
use sha2::Sha512;
use transfer_shared::config::TransferTokenConfig;

use crate::errors::ConfigurationError;

type HmacSha512 = Hmac<Sha512>;

/// Length of a hex encoded HMAC-SHA512 digest
pub const ACCESS_KEY_HASH_LENGTH: usize = 128;

/// Computes the hex encoded HMAC-SHA512 of `access_key` keyed by `salt`
pub fn hash_access_key(access_key: &str, salt: &str) -> Result<String, ConfigurationError> {
    let mut mac =
        HmacSha512::new_from_slice(salt.as_bytes()).map_err(|_| ConfigurationError::InvalidSalt)?;
    mac.update(access_key.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Hashes access keys with the configured salt
#[derive(Clone)]
pub struct AccessKeyHasher {
    salt: Option<String>,
}

impl AccessKeyHasher {
    pub fn new(salt: Option<String>) -> Self {
        Self { salt }
    }

    pub fn from_config(config: &TransferTokenConfig) -> Self {
        Self::new(config.salt.clone())
    }

    /// Whether a usable (non-blank) salt is configured
    pub fn has_valid_salt(&self) -> bool {
        self.usable_salt().is_ok()
    }

    /// Hash an access key, failing when the salt is missing or blank
    pub fn hash(&self, access_key: &str) -> Result<String, ConfigurationError> {
        hash_access_key(access_key, self.usable_salt()?)
    }

    fn usable_salt(&self) -> Result<&str, ConfigurationError> {
        match self.salt.as_deref() {
            None => Err(ConfigurationError::MissingSalt),
            Some(salt) if salt.trim().is_empty() => Err(ConfigurationError::InvalidSalt),
            Some(salt) => Ok(salt),
        }
    }
}

impl std::fmt::Debug for AccessKeyHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessKeyHasher")
            .field("salt", &self.salt.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
