//! Access key generation and validation

use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::ValidationError;

/// Bytes of randomness behind a generated access key
pub const ACCESS_KEY_BYTES: usize = 128;

/// Length of a generated (hex encoded) access key
pub const ACCESS_KEY_LENGTH: usize = ACCESS_KEY_BYTES * 2;

/// Shortest access key a caller may supply
pub const MIN_ACCESS_KEY_LENGTH: usize = 15;

/// Generates a random access key from the operating system RNG
pub fn generate_access_key() -> String {
    let mut bytes = [0u8; ACCESS_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Validates a caller-supplied access key and returns it unchanged
pub fn validate_access_key(candidate: &str) -> Result<String, ValidationError> {
    let actual = candidate.chars().count();
    if actual < MIN_ACCESS_KEY_LENGTH {
        return Err(ValidationError::InvalidAccessKey {
            min_length: MIN_ACCESS_KEY_LENGTH,
            actual,
        });
    }
    Ok(candidate.to_string())
}
