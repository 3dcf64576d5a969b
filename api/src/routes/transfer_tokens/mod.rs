//! Transfer token administration endpoints
//!
//! - `GET    /transfer/tokens` lists tokens by name
//! - `POST   /transfer/tokens` issues a token and returns its access key once
//! - `GET    /transfer/tokens/{id}`
//! - `PUT    /transfer/tokens/{id}` updates name, description, lifespan, permissions
//! - `DELETE /transfer/tokens/{id}` revokes; unknown ids answer `data: null`
//! - `POST   /transfer/tokens/{id}/regenerate` issues a new access key

pub mod create;
pub mod get;
pub mod list;
pub mod regenerate;
pub mod revoke;
pub mod update;

use actix_web::web;
use std::sync::Arc;
use uuid::Uuid;

use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::{PermissionRegistry, TransferTokenService};
use transfer_infra::DatabasePool;

/// Application state that holds shared services
pub struct AppState<R, P>
where
    R: TransferTokenRepository,
    P: PermissionRegistry,
{
    pub transfer_tokens: Arc<TransferTokenService<R, P>>,
    /// Pool probed by `/health`; `None` when tokens live in memory
    pub database: Option<DatabasePool>,
}

impl<R, P> AppState<R, P>
where
    R: TransferTokenRepository,
    P: PermissionRegistry,
{
    pub fn new(service: TransferTokenService<R, P>) -> Self {
        Self {
            transfer_tokens: Arc::new(service),
            database: None,
        }
    }

    pub fn with_database(mut self, pool: DatabasePool) -> Self {
        self.database = Some(pool);
        self
    }
}

/// Registers the token routes under the current scope
pub fn configure<R, P>(cfg: &mut web::ServiceConfig)
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    cfg.service(
        web::scope("/transfer/tokens")
            .route("", web::get().to(list::list_tokens::<R, P>))
            .route("", web::post().to(create::create_token::<R, P>))
            .route("/{id}", web::get().to(get::get_token::<R, P>))
            .route("/{id}", web::put().to(update::update_token::<R, P>))
            .route("/{id}", web::delete().to(revoke::revoke_token::<R, P>))
            .route(
                "/{id}/regenerate",
                web::post().to(regenerate::regenerate_token::<R, P>),
            ),
    );
}

/// Token ids that are not UUIDs cannot match any token
pub(crate) fn parse_token_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}
