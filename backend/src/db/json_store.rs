use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::db::ItemStore;
use crate::error::AppError;
use crate::models::Item;

/// Item collection kept as one pretty-printed JSON array on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl ItemStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<Item>, AppError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("no item file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<Item> = serde_json::from_str(&raw)?;
        debug!("loaded {} items from {}", items.len(), self.path.display());
        Ok(items)
    }

    async fn save_all(&self, items: &[Item]) -> Result<(), AppError> {
        let data = serde_json::to_vec_pretty(items)?;

        // Write next to the target and rename so readers never see a torn file.
        let staging = self.staging_path();
        fs::write(&staging, &data).await?;
        fs::rename(&staging, &self.path).await?;

        debug!("saved {} items to {}", items.len(), self.path.display());
        Ok(())
    }
}
