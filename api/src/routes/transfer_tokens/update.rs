use actix_web::{web, HttpResponse};
use validator::Validate;

use transfer_core::errors::DomainError;
use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::PermissionRegistry;

use super::{parse_token_id, AppState};
use crate::dto::{DataResponse, UpdateTransferTokenRequest};
use crate::handlers::{handle_domain_error, handle_validation_errors};

/// Handler for PUT /api/v1/transfer/tokens/{id}
///
/// Omitted fields are left unchanged. `"permissions": []` removes every
/// permission and `"lifespan": null` makes the token unlimited; the
/// expiration date set at creation is kept.
pub async fn update_token<R, P>(
    state: web::Data<AppState<R, P>>,
    path: web::Path<String>,
    request: web::Json<UpdateTransferTokenRequest>,
) -> HttpResponse
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    let Some(id) = parse_token_id(&path) else {
        return handle_domain_error(DomainError::token_not_found(path.as_str()));
    };

    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    match state.transfer_tokens.update(id, request.into()).await {
        Ok(token) => HttpResponse::Ok().json(DataResponse::new(token)),
        Err(error) => handle_domain_error(error),
    }
}
