use actix_web::{web, HttpResponse};

use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::PermissionRegistry;

use super::{parse_token_id, AppState};
use crate::dto::DataResponse;
use crate::handlers::handle_domain_error;

/// Handler for DELETE /api/v1/transfer/tokens/{id}
///
/// Answers with the revoked token, or `null` when no token had this id.
pub async fn revoke_token<R, P>(
    state: web::Data<AppState<R, P>>,
    path: web::Path<String>,
) -> HttpResponse
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    let Some(id) = parse_token_id(&path) else {
        return HttpResponse::Ok().json(DataResponse::new(serde_json::Value::Null));
    };

    match state.transfer_tokens.revoke(id).await {
        Ok(revoked) => HttpResponse::Ok().json(DataResponse::new(revoked)),
        Err(error) => handle_domain_error(error),
    }
}
