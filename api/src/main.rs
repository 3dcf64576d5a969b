use actix_web::{web, HttpServer};
use tracing::{info, warn};

use transfer_api::app::create_app;
use transfer_api::routes::transfer_tokens::AppState;
use transfer_api::telemetry::init_tracing;
use transfer_core::repositories::{InMemoryTransferTokenRepository, TransferTokenRepository};
use transfer_core::services::transfer::{
    PermissionRegistry, StaticPermissionRegistry, TransferTokenService,
};
use transfer_infra::{DatabasePool, MySqlTransferTokenRepository};
use transfer_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    info!(environment = %config.environment, "Starting transfer token API server");

    let registry = StaticPermissionRegistry::from_config(&config.transfer);

    if config.database.is_configured() {
        let pool = transfer_infra::initialize(&config.database).await?;
        let repository = MySqlTransferTokenRepository::from_database(&pool);
        let service = TransferTokenService::from_config(repository, registry, &config.transfer);

        let result = serve(&config, service, Some(pool.clone())).await;
        pool.close().await;
        result?;
    } else {
        warn!("DATABASE_URL is not set; tokens are kept in memory and lost on restart");
        let repository = InMemoryTransferTokenRepository::new();
        let service = TransferTokenService::from_config(repository, registry, &config.transfer);

        serve(&config, service, None).await?;
    }

    Ok(())
}

async fn serve<R, P>(
    config: &AppConfig,
    service: TransferTokenService<R, P>,
    database: Option<DatabasePool>,
) -> std::io::Result<()>
where
    R: TransferTokenRepository + 'static,
    P: PermissionRegistry + 'static,
{
    service.check_salt_configured();

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut state = AppState::new(service);
    if let Some(pool) = database {
        state = state.with_database(pool);
    }
    let state = web::Data::new(state);
    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await
}
