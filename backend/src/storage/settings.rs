use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{Settings, UpdateSettingsRequest};

/// Settings kept as one JSON document.
pub struct SettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<Settings, AppError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn update(&self, req: UpdateSettingsRequest) -> Result<Settings, AppError> {
        let _guard = self.lock.lock().await;
        let mut settings = self.read().await?;
        settings.merge(req)?;
        self.write(&settings).await?;
        info!("settings updated");
        Ok(settings)
    }

    /// Writes the defaults unless a settings file already exists.
    pub async fn ensure_exists(&self) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        self.write(&Settings::default()).await
    }

    async fn read(&self) -> Result<Settings, AppError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("no settings at {}, using defaults", self.path.display());
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, settings: &Settings) -> Result<(), AppError> {
        let data = serde_json::to_vec_pretty(settings)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, &data).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}
