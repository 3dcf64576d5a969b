//! # Infrastructure Layer
//!
//! Concrete persistence for the transfer token core. The MySQL store
//! implements the repository traits from `transfer_core` using SQLx.
//!
//! ## Architecture
//!
//! - **Database**: connection pool management and migrations
//! - **MySQL repositories**: `TransferTokenRepository` over SQLx transactions

pub use transfer_core::errors::*;

/// Database module - MySQL implementations using SQLx
pub mod database;

pub use database::{DatabasePool, MySqlTransferTokenRepository};

use transfer_shared::config::DatabaseConfig;

/// Connects to the configured database and applies pending migrations
/// when `run_migrations` is set.
///
/// # Returns
/// * `Ok(DatabasePool)` - Ready connection pool
/// * `Err(InfrastructureError)` - Missing URL, connection or migration failure
pub async fn initialize(config: &DatabaseConfig) -> Result<DatabasePool, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let pool = DatabasePool::new(config).await?;
    if config.run_migrations {
        pool.run_migrations().await?;
    }

    tracing::info!("Infrastructure services initialized successfully");
    Ok(pool)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
