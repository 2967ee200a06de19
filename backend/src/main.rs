use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jianji::api::router;
use jianji::config::{AppConfig, StoreBackend};
use jianji::db::{ItemStore, JsonFileStore, SqliteItemStore};
use jianji::services::ReminderScheduler;
use jianji::state::AppState;
use jianji::storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jianji=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    storage::init_data_dir(&config).await?;

    let store: Arc<dyn ItemStore> = match &config.store {
        StoreBackend::Json => Arc::new(JsonFileStore::new(config.items_path())),
        StoreBackend::Sqlite { database_url } => {
            Arc::new(SqliteItemStore::connect(database_url).await?)
        }
    };

    let state = AppState::new(&config, store);

    let scheduler = ReminderScheduler::new(state.scanner.clone(), config.reminder_interval).spawn();

    let app = router(state.clone());

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.abort();
    state.indicator.stop();
    info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
