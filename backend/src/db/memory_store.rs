use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::db::ItemStore;
use crate::error::AppError;
use crate::models::Item;

/// In-process store. Counts saves so callers can tell whether a write happened.
#[derive(Default)]
pub struct MemoryItemStore {
    items: Mutex<Vec<Item>>,
    saves: AtomicUsize,
}

impl MemoryItemStore {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn load_all(&self) -> Result<Vec<Item>, AppError> {
        Ok(self.snapshot())
    }

    async fn save_all(&self, items: &[Item]) -> Result<(), AppError> {
        *self.items.lock().unwrap_or_else(|e| e.into_inner()) = items.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
