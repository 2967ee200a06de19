use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;

/// Location of a stored image: `path` goes into an item's `images`, `url` is for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedImage {
    pub path: String,
    pub url: String,
}

/// Image attachments stored as `<uuid>.<ext>` files in one directory.
#[derive(Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Saves a `data:image/<ext>;base64,<payload>` URL.
    pub async fn save(&self, data_url: &str) -> Result<SavedImage, AppError> {
        let (ext, bytes) = parse_data_url(data_url)?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = self.dir.join(&filename);
        fs::write(&file_path, &bytes).await?;

        info!("saved image {} ({} bytes)", filename, bytes.len());
        Ok(SavedImage {
            path: format!("images/{}", filename),
            url: file_url(&file_path),
        })
    }

    /// Deletes by basename, so both `images/x.png` and `x.png` work.
    pub async fn delete(&self, image_path: &str) -> Result<(), AppError> {
        let filename = basename(image_path)?;
        match fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => {
                info!("deleted image {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub fn url_for(&self, image_path: &str) -> Result<String, AppError> {
        let filename = basename(image_path)?;
        Ok(file_url(&self.dir.join(filename)))
    }
}

fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>), AppError> {
    let invalid = || AppError::Validation("invalid image data".to_string());

    let rest = data_url.strip_prefix("data:image/").ok_or_else(invalid)?;
    let (ext, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;

    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid());
    }
    if payload.is_empty() {
        return Err(invalid());
    }

    let bytes = STANDARD.decode(payload).map_err(|e| {
        AppError::Validation(format!("invalid image data: {}", e))
    })?;
    Ok((ext.to_string(), bytes))
}

fn basename(image_path: &str) -> Result<&str, AppError> {
    Path::new(image_path)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::Validation(format!("invalid image path: {}", image_path)))
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
