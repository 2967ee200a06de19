pub mod json_store;
pub mod memory_store;
pub mod repository;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Item;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryItemStore;
pub use repository::SqliteItemStore;

/// Durable storage of the whole item collection.
///
/// Implementations must make `save_all` all-or-nothing: after a failed save the
/// previously stored collection is still what `load_all` returns.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Item>, AppError>;

    async fn save_all(&self, items: &[Item]) -> Result<(), AppError>;

    async fn ping(&self) -> Result<(), AppError> {
        self.load_all().await.map(|_| ())
    }
}
