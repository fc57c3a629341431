use std::sync::Arc;

use catalog_api::app::app;
use catalog_api::config::AppConfig;
use catalog_api::database::DatabaseManager;
use catalog_api::media::CloudinaryStore;
use catalog_api::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, CLOUDINARY_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env();
    info!("Starting catalog API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    if config.database.run_migrations {
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            warn!(error = %e, "Migrations not applied; continuing without them");
        }
    }

    let media = Arc::new(CloudinaryStore::new(&config.media)?);
    let port = config.port;
    let state = AppState::new(pool.clone(), media, config);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
