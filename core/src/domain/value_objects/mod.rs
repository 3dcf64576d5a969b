//! Value objects describing token inputs and store queries.

pub mod token_attributes;
pub mod token_query;

// Re-export commonly used types
pub use token_attributes::{deserialize_present, CreateTransferToken, UpdateTransferToken};
pub use token_query::{NewTransferToken, TokenChanges, TokenFilter, TokenOrder};
