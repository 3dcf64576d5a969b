use actix_web::{web, HttpResponse};
use validator::Validate;

use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::PermissionRegistry;

use super::AppState;
use crate::dto::{CreateTransferTokenRequest, DataResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};

/// Handler for POST /api/v1/transfer/tokens
///
/// # Request Body
///
/// ```json
/// {
///     "name": "ci",
///     "description": "nightly sync",
///     "lifespan": 604800000,
///     "permissions": ["push"]
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the token and its `accessKey`. The key is shown only
/// in this response.
pub async fn create_token<R, P>(
    state: web::Data<AppState<R, P>>,
    request: web::Json<CreateTransferTokenRequest>,
) -> HttpResponse
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(errors);
    }

    match state.transfer_tokens.create(request.into()).await {
        Ok(issued) => HttpResponse::Created().json(DataResponse::new(issued)),
        Err(error) => handle_domain_error(error),
    }
}
