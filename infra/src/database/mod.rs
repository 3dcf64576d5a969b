//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - Repository implementations with transaction support
//! - Schema migrations

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{MySqlTransaction, MySqlTransferTokenRepository};
