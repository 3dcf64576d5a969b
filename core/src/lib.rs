//! # Transfer Token Core
//!
//! Core business logic for transfer token administration.
//! This crate contains domain entities, the token lifecycle service,
//! repository interfaces, and error types that form the foundation of
//! the application architecture.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    IssuedTransferToken, SanitizedTransferToken, TransferToken, TransferTokenPermission,
};
pub use domain::value_objects::{
    CreateTransferToken, NewTransferToken, TokenChanges, TokenFilter, TokenOrder,
    UpdateTransferToken,
};
pub use errors::{ConfigurationError, DomainError, DomainResult, ValidationError};
pub use repositories::{
    InMemoryTransaction, InMemoryTransferTokenRepository, TransferTokenRepository,
    TransferTokenTransaction,
};
pub use services::{
    AccessKeyHasher, LifespanPolicy, PermissionRegistry, StaticPermissionRegistry,
    TransferTokenService, TransferTokenServiceConfig,
};
