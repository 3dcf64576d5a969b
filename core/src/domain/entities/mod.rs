//! Domain entities representing core business objects.

pub mod transfer_token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use transfer_token::{
    IssuedTransferToken, SanitizedTransferToken, TransferToken, TransferTokenPermission,
};
