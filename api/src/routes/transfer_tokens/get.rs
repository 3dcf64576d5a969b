use actix_web::{web, HttpResponse};

use transfer_core::errors::DomainError;
use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::PermissionRegistry;

use super::{parse_token_id, AppState};
use crate::dto::DataResponse;
use crate::handlers::handle_domain_error;

/// Handler for GET /api/v1/transfer/tokens/{id}
pub async fn get_token<R, P>(
    state: web::Data<AppState<R, P>>,
    path: web::Path<String>,
) -> HttpResponse
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    let Some(id) = parse_token_id(&path) else {
        return handle_domain_error(DomainError::token_not_found(path.as_str()));
    };

    match state.transfer_tokens.get_by_id(id).await {
        Ok(Some(token)) => HttpResponse::Ok().json(DataResponse::new(token)),
        Ok(None) => handle_domain_error(DomainError::token_not_found(id)),
        Err(error) => handle_domain_error(error),
    }
}
