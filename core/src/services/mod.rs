//! Business services containing domain logic and use cases.

pub mod transfer;

// Re-export commonly used types
pub use transfer::{
    AccessKeyHasher, LifespanPolicy, PermissionRegistry, StaticPermissionRegistry,
    TransferTokenService, TransferTokenServiceConfig,
};
