//! Transfer token service module
//!
//! This module handles the transfer token lifecycle:
//! - Access key generation, validation and salted hashing
//! - Lifespan policy and expiration derivation
//! - Permission validation and reconciliation
//! - Create, list, lookup, update, revoke and regenerate orchestration

mod config;
mod hasher;
mod lifespan;
mod permissions;
mod secret;
mod service;

#[cfg(test)]
mod tests;

pub use config::TransferTokenServiceConfig;
pub use hasher::{hash_access_key, AccessKeyHasher, ACCESS_KEY_HASH_LENGTH};
pub use lifespan::{resolve_expiration, resolve_expiration_at, ExpirationFields, LifespanPolicy};
pub use permissions::{
    diff_permissions, validate_permissions, PermissionDiff, PermissionRegistry,
    StaticPermissionRegistry,
};
pub use secret::{
    generate_access_key, validate_access_key, ACCESS_KEY_BYTES, ACCESS_KEY_LENGTH,
    MIN_ACCESS_KEY_LENGTH,
};
pub use service::TransferTokenService;
