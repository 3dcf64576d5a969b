//! Shared configuration and response types for the transfer token server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The error response envelope returned by the HTTP layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig, ServerConfig,
    TransferTokenConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
