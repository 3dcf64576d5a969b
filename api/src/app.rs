//! Application factory
//!
//! Builds the Actix-web application around an already constructed
//! transfer token service.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use transfer_core::repositories::TransferTokenRepository;
use transfer_core::services::transfer::PermissionRegistry;

use crate::handlers::error::{json_error_handler, not_found};
use crate::routes::transfer_tokens::{self, AppState};

/// Create and configure the application with all dependencies
pub fn create_app<R, P>(
    app_state: web::Data<AppState<R, P>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check::<R, P>))
        // API v1 routes
        .service(web::scope("/api/v1").configure(transfer_tokens::configure::<R, P>))
        // Default 404 handler
        .default_service(web::route().to(|| async {
            not_found("The requested resource was not found")
        }))
}

/// Health check endpoint handler
async fn health_check<R, P>(state: web::Data<AppState<R, P>>) -> HttpResponse
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    let database = match &state.database {
        None => "memory",
        Some(pool) => match pool.health_check().await {
            Ok(true) => "up",
            _ => "down",
        },
    };

    let (mut response, status) = if database == "down" {
        (HttpResponse::ServiceUnavailable(), "unhealthy")
    } else {
        (HttpResponse::Ok(), "healthy")
    };

    response.json(serde_json::json!({
        "status": status,
        "service": "transfer-api",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "transferTokensEnabled": state.transfer_tokens.is_enabled(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
