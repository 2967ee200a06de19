pub mod images;
pub mod settings;

use tokio::fs;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::error::AppError;

pub use images::{ImageStore, SavedImage};
pub use settings::SettingsStore;

/// Creates the data layout on first launch: data and image directories, an empty
/// item list for the JSON backend, and default settings.
pub async fn init_data_dir(config: &AppConfig) -> Result<(), AppError> {
    fs::create_dir_all(&config.data_dir).await?;
    fs::create_dir_all(config.images_dir()).await?;

    if config.store == StoreBackend::Json && !fs::try_exists(config.items_path()).await? {
        fs::write(config.items_path(), "[]").await?;
    }

    SettingsStore::new(config.settings_path())
        .ensure_exists()
        .await?;

    info!("data directory ready: {}", config.data_dir.display());
    Ok(())
}
