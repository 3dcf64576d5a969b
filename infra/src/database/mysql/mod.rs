//! MySQL repository implementations

pub mod transfer_token_repository_impl;

pub use transfer_token_repository_impl::{MySqlTransaction, MySqlTransferTokenRepository};
