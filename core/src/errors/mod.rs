//! Domain-specific error types and error handling.

mod types;


pub use types::{ConfigurationError, ValidationError};

use thiserror::Error;
use transfer_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    /// Shorthand for a missing transfer token
    pub fn token_not_found(id: impl std::fmt::Display) -> Self {
        DomainError::NotFound {
            resource: format!("transfer token {}", id),
        }
    }

    /// Wrap a failure reported by the persistence layer
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DomainError::Validation(ValidationError::UnknownActions { actions }) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, self.to_string())
                    .add_detail("actions", actions)
            }
            DomainError::Validation(ValidationError::RequiredField { field }) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, self.to_string())
                    .add_detail("field", field)
            }
            DomainError::Validation(_) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, self.to_string())
            }
            DomainError::NotFound { .. } => {
                ErrorResponse::new(error_codes::NOT_FOUND, self.to_string())
            }
            DomainError::Configuration(_) => {
                ErrorResponse::new(error_codes::CONFIGURATION_ERROR, self.to_string())
            }
            // Store details stay in the logs
            DomainError::Storage { .. } => {
                ErrorResponse::new(error_codes::DATABASE_ERROR, "A storage error occurred")
            }
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
