use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use patrol_api::app::{create_app, AppState};
use patrol_api::config::Config;
use patrol_api::jobs::{JobScheduler, PoolMetricsJob, WorkflowGaugesJob};
use patrol_api::middleware::{init_metrics, logging::init_logging};
use patrol_api::services::{ConsoleNotificationService, FsBlobStore};
use persistence::PgEntityStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting patrol API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let store = Arc::new(PgEntityStore::new(pool.clone()));
    let blobs = Arc::new(FsBlobStore::new(&config.uploads));
    tokio::fs::create_dir_all(blobs.root())
        .await
        .with_context(|| format!("Failed to create upload directory {}", blobs.root().display()))?;
    let notifier = Arc::new(ConsoleNotificationService::new(config.email.clone()));

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    scheduler.register(WorkflowGaugesJob::new(store.clone()));
    scheduler.start();

    let addr = config.socket_addr().context("Invalid server address")?;
    let state = AppState::new(config, store, blobs, notifier)?;
    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
