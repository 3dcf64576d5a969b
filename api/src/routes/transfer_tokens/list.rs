use actix_web::{web, HttpResponse};

use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::PermissionRegistry;

use super::AppState;
use crate::dto::DataResponse;
use crate::handlers::handle_domain_error;

/// Handler for GET /api/v1/transfer/tokens
///
/// Returns every token ordered by name. Access keys and hashes are never
/// part of the payload.
pub async fn list_tokens<R, P>(state: web::Data<AppState<R, P>>) -> HttpResponse
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    match state.transfer_tokens.list().await {
        Ok(tokens) => HttpResponse::Ok().json(DataResponse::new(tokens)),
        Err(error) => handle_domain_error(error),
    }
}
