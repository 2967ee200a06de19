use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::AppError;
use crate::models::{Item, NewItemRequest, UpdateItemRequest};
use crate::services::collection::{ItemCollection, Mutation};

/// CRUD over the item collection.
pub struct ItemService {
    items: Arc<ItemCollection>,
}

impl ItemService {
    pub fn new(items: Arc<ItemCollection>) -> Self {
        Self { items }
    }

    pub async fn list(&self) -> Result<Vec<Item>, AppError> {
        self.items.read().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Item>, AppError> {
        let items = self.items.read().await?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    pub async fn create(&self, req: NewItemRequest) -> Result<Item, AppError> {
        let item = Item::new(req, Utc::now());
        let created = self
            .items
            .mutate(move |items| {
                items.push(item.clone());
                Ok(Mutation::Changed(item))
            })
            .await?;

        info!("created {} {}", created.kind.as_str(), created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &str, req: UpdateItemRequest) -> Result<Item, AppError> {
        let now = Utc::now();
        self.items
            .mutate(move |items| {
                let item = find_mut(items, id)?;
                item.apply(req, now);
                Ok(Mutation::Changed(item.clone()))
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.items
            .mutate(|items| {
                let before = items.len();
                items.retain(|item| item.id != id);
                if items.len() == before {
                    return Err(AppError::NotFound);
                }
                Ok(Mutation::Changed(()))
            })
            .await?;

        info!("deleted item {}", id);
        Ok(())
    }

    /// Flips completion. Completed items are skipped by the reminder scan.
    pub async fn toggle_complete(&self, id: &str) -> Result<Item, AppError> {
        let now = Utc::now();
        self.items
            .mutate(move |items| {
                let item = find_mut(items, id)?;
                item.completed = !item.completed;
                item.updated_at = now;
                Ok(Mutation::Changed(item.clone()))
            })
            .await
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.items.ping().await
    }
}

fn find_mut<'a>(items: &'a mut [Item], id: &str) -> Result<&'a mut Item, AppError> {
    items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};

    use crate::db::MemoryItemStore;
    use crate::models::{ItemKind, Repeat};
    use crate::notify::ChangeObserver;

    #[derive(Default)]
    struct RecordingObserver {
        batches: Mutex<Vec<usize>>,
    }

    impl ChangeObserver for RecordingObserver {
        fn notify(&self, items: &[Item]) {
            self.batches.lock().unwrap().push(items.len());
        }
    }

    fn service() -> (ItemService, Arc<MemoryItemStore>, Arc<RecordingObserver>) {
        let store = Arc::new(MemoryItemStore::default());
        let observer = Arc::new(RecordingObserver::default());
        let collection = Arc::new(ItemCollection::new(store.clone(), observer.clone()));
        (ItemService::new(collection), store, observer)
    }

    fn todo(title: &str) -> NewItemRequest {
        NewItemRequest {
            title: Some(title.to_string()),
            kind: Some(ItemKind::Todo),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_appends_and_notifies() {
        let (service, store, observer) = service();

        let first = service.create(todo("first")).await.unwrap();
        let second = service.create(NewItemRequest::default()).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);
        assert_eq!(second.title, "Untitled");
        assert_eq!(store.save_count(), 2);
        assert_eq!(*observer.batches.lock().unwrap(), vec![1, 2]);
        assert_eq!(service.get(&first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (service, _store, _observer) = service();
        let created = service.create(todo("draft")).await.unwrap();
        let remind_at = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateItemRequest {
                    content: Some("body".to_string()),
                    remind_at: Some(Some(remind_at)),
                    repeat: Some(Repeat::Monthly),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "draft");
        assert_eq!(updated.content, "body");
        assert_eq!(updated.remind_at, Some(remind_at));
        assert_eq!(updated.repeat, Repeat::Monthly);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found_without_writes() {
        let (service, store, observer) = service();

        assert!(matches!(
            service.update("nope", UpdateItemRequest::default()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(service.delete("nope").await, Err(AppError::NotFound)));
        assert!(matches!(
            service.toggle_complete("nope").await,
            Err(AppError::NotFound)
        ));
        assert_eq!(service.get("nope").await.unwrap(), None);
        assert_eq!(store.save_count(), 0);
        assert!(observer.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_complete_flips_back_and_forth() {
        let (service, _store, _observer) = service();
        let created = service.create(todo("laundry")).await.unwrap();

        assert!(service.toggle_complete(&created.id).await.unwrap().completed);
        assert!(!service.toggle_complete(&created.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (service, _store, _observer) = service();
        let kept = service.create(todo("keep")).await.unwrap();
        let gone = service.create(todo("gone")).await.unwrap();

        service.delete(&gone.id).await.unwrap();

        assert_eq!(service.list().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_not_lost() {
        let (service, _store, _observer) = service();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.create(todo(&format!("item {n}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.list().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_update_can_clear_reminder() {
        let (service, _store, _observer) = service();
        let created = service
            .create(NewItemRequest {
                remind_at: Some(Utc::now() + Duration::hours(1)),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateItemRequest {
                    remind_at: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.remind_at, None);
    }
}
