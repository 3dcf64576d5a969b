//! Validation and configuration error types for transfer token operations
//!
//! Validation errors are always raised before any write reaches the store.

use thiserror::Error;

/// Input validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Access key must be at least {min_length} characters (got {actual})")]
    InvalidAccessKey { min_length: usize, actual: usize },

    #[error("Unknown permissions provided: {}", actions.join(", "))]
    UnknownActions { actions: Vec<String> },

    #[error("lifespan must be a positive number or null (got {value})")]
    InvalidLifespan { value: i64 },

    #[error("lifespan must be one of {allowed:?} or null (got {value})")]
    DisallowedLifespan { value: i64, allowed: Vec<i64> },

    #[error("Required field: {field}")]
    RequiredField { field: String },
}

/// Configuration problems detected while performing an operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing transfer token salt: set TRANSFER_TOKEN_SALT to hash access keys")]
    MissingSalt,

    #[error("Invalid transfer token salt: TRANSFER_TOKEN_SALT is blank")]
    InvalidSalt,
}
