use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::ItemStore;
use crate::error::AppError;
use crate::models::Item;
use crate::notify::ChangeObserver;

/// Result of a mutation closure: whether the collection must be written back.
pub enum Mutation<T> {
    Changed(T),
    Unchanged(T),
}

/// Single writer over the stored collection.
///
/// Every operation holds one lock for its whole load, mutate, save sequence, so a
/// scan tick and a user edit can never interleave and drop each other's update.
/// Observers are notified once per successful save.
pub struct ItemCollection {
    store: Arc<dyn ItemStore>,
    observer: Arc<dyn ChangeObserver>,
    lock: Mutex<()>,
}

impl ItemCollection {
    pub fn new(store: Arc<dyn ItemStore>, observer: Arc<dyn ChangeObserver>) -> Self {
        Self {
            store,
            observer,
            lock: Mutex::new(()),
        }
    }

    pub async fn read(&self) -> Result<Vec<Item>, AppError> {
        let _guard = self.lock.lock().await;
        self.store.load_all().await
    }

    pub async fn mutate<T, F>(&self, apply: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Vec<Item>) -> Result<Mutation<T>, AppError> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.store.load_all().await?;

        match apply(&mut items)? {
            Mutation::Unchanged(value) => Ok(value),
            Mutation::Changed(value) => {
                self.store.save_all(&items).await?;
                self.observer.notify(&items);
                Ok(value)
            }
        }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
