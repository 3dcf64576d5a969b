use actix_web::{error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse};
use std::collections::HashMap;
use validator::ValidationErrors;

use transfer_core::errors::DomainError;
use transfer_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Configuration(_) | DomainError::Storage { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Transfer token request failed");
    } else {
        tracing::warn!(error = %error, "Transfer token request rejected");
    }
    HttpResponse::build(status).json(error.to_error_response())
}

/// Convert request DTO validation failures into a 400 response listing each field
pub fn handle_validation_errors(errors: ValidationErrors) -> HttpResponse {
    let mut fields: HashMap<String, Vec<String>> = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }

    tracing::warn!(fields = ?fields, "Request validation failed");

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
            .add_detail("fields", fields),
    )
}

/// Error handler for malformed JSON bodies
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = error.to_string();
    let response = HttpResponse::BadRequest()
        .json(ErrorResponse::new(error_codes::BAD_REQUEST, message));
    actix_web::error::InternalError::from_response(error, response).into()
}

/// 404 response for unknown tokens and unknown routes
pub fn not_found(message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(error_codes::NOT_FOUND, message))
}
