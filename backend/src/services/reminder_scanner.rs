use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{Item, ReminderState};
use crate::notify::AlertSignaler;
use crate::services::collection::{ItemCollection, Mutation};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Items with an active reminder that were examined.
    pub scanned: usize,
    pub fired: usize,
}

/// Stamps every due item with `last_reminded_at = now` and returns the stamped copies.
///
/// An item fires at most once per occurrence: after stamping, `last_reminded_at` is no
/// longer before `remind_at`, so later ticks leave it alone until the reminder moves.
pub fn mark_due(items: &mut [Item], now: DateTime<Utc>) -> (ScanReport, Vec<Item>) {
    let mut report = ScanReport::default();
    let mut fired = Vec::new();

    for item in items.iter_mut() {
        if item.completed || item.remind_at.is_none() {
            continue;
        }
        report.scanned += 1;

        if item.reminder_state(now) == ReminderState::Due {
            item.last_reminded_at = Some(now);
            fired.push(item.clone());
        }
    }

    report.fired = fired.len();
    (report, fired)
}

pub struct ReminderScanner {
    items: Arc<ItemCollection>,
    signaler: Arc<dyn AlertSignaler>,
}

impl ReminderScanner {
    pub fn new(items: Arc<ItemCollection>, signaler: Arc<dyn AlertSignaler>) -> Self {
        Self { items, signaler }
    }

    /// One scan. Alerts go out only after the stamped batch is saved, so a failed
    /// save means the same occurrences are retried on the next tick.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<ScanReport, AppError> {
        let (report, fired) = self
            .items
            .mutate(|items| {
                let (report, fired) = mark_due(items, now);
                if fired.is_empty() {
                    Ok(Mutation::Unchanged((report, fired)))
                } else {
                    Ok(Mutation::Changed((report, fired)))
                }
            })
            .await?;

        for item in &fired {
            self.signaler.fire(item);
        }

        Ok(report)
    }

    /// Runs a tick and logs instead of propagating failures.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Option<ScanReport> {
        match self.tick(now).await {
            Ok(report) => {
                if report.fired > 0 {
                    info!("fired {} of {} active reminders", report.fired, report.scanned);
                } else {
                    debug!("reminder scan: {} active, none due", report.scanned);
                }
                Some(report)
            }
            Err(e) => {
                warn!("reminder scan failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    use crate::db::{ItemStore, MemoryItemStore};
    use crate::models::NewItemRequest;
    use crate::notify::NoopObserver;

    #[derive(Default)]
    struct RecordingSignaler {
        fired: Mutex<Vec<String>>,
    }

    impl RecordingSignaler {
        fn fired(&self) -> Vec<String> {
            self.fired.lock().unwrap().clone()
        }
    }

    impl AlertSignaler for RecordingSignaler {
        fn fire(&self, item: &Item) {
            self.fired.lock().unwrap().push(item.id.clone());
        }

        fn stop_indicator(&self) {}
    }

    struct FailingSaveStore {
        items: Vec<Item>,
    }

    #[async_trait]
    impl ItemStore for FailingSaveStore {
        async fn load_all(&self) -> Result<Vec<Item>, AppError> {
            Ok(self.items.clone())
        }

        async fn save_all(&self, _items: &[Item]) -> Result<(), AppError> {
            Err(AppError::Io(std::io::Error::other("disk full")))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn item(title: &str, remind_at: Option<DateTime<Utc>>) -> Item {
        Item::new(
            NewItemRequest {
                title: Some(title.to_string()),
                remind_at,
                ..Default::default()
            },
            now() - Duration::days(1),
        )
    }

    fn scanner_over(
        items: Vec<Item>,
    ) -> (ReminderScanner, Arc<MemoryItemStore>, Arc<RecordingSignaler>) {
        let store = Arc::new(MemoryItemStore::new(items));
        let signaler = Arc::new(RecordingSignaler::default());
        let collection = Arc::new(ItemCollection::new(store.clone(), Arc::new(NoopObserver)));
        (
            ReminderScanner::new(collection, signaler.clone()),
            store,
            signaler,
        )
    }

    #[test]
    fn test_mark_due_selects_only_unfired_due_items() {
        let mut fired_before = item("fired", Some(now() - Duration::minutes(5)));
        fired_before.last_reminded_at = Some(now() - Duration::minutes(4));
        let mut stale_stamp = item("stale", Some(now() - Duration::minutes(5)));
        stale_stamp.last_reminded_at = Some(now() - Duration::days(1));
        let mut done = item("done", Some(now() - Duration::minutes(5)));
        done.completed = true;

        let mut items = vec![
            item("due", Some(now())),
            item("future", Some(now() + Duration::seconds(1))),
            item("idle", None),
            fired_before,
            stale_stamp,
            done,
        ];

        let (report, fired) = mark_due(&mut items, now());
        let titles: Vec<&str> = fired.iter().map(|i| i.title.as_str()).collect();

        assert_eq!(titles, vec!["due", "stale"]);
        assert_eq!(report, ScanReport { scanned: 4, fired: 2 });
        assert_eq!(items[0].last_reminded_at, Some(now()));
        assert_eq!(items[4].last_reminded_at, Some(now()));
        assert_eq!(items[1].last_reminded_at, None);
    }

    #[tokio::test]
    async fn test_due_item_fires_once_across_ticks() {
        let overdue = item("overdue", Some(now() - Duration::hours(1)));
        let id = overdue.id.clone();
        let (scanner, store, signaler) = scanner_over(vec![overdue]);

        let first = scanner.tick(now()).await.unwrap();
        let second = scanner.tick(now() + Duration::seconds(10)).await.unwrap();

        assert_eq!(first.fired, 1);
        assert_eq!(second.fired, 0);
        assert_eq!(signaler.fired(), vec![id]);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot()[0].last_reminded_at, Some(now()));
    }

    #[tokio::test]
    async fn test_completed_collection_makes_no_fires_or_writes() {
        let items: Vec<Item> = (0..3)
            .map(|n| {
                let mut it = item(&format!("done {n}"), Some(now() - Duration::hours(n)));
                it.completed = true;
                it
            })
            .collect();
        let (scanner, store, signaler) = scanner_over(items);

        let report = scanner.tick(now()).await.unwrap();

        assert_eq!(report, ScanReport::default());
        assert!(signaler.fired().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_is_saved_once_per_tick() {
        let items = vec![
            item("a", Some(now() - Duration::minutes(1))),
            item("b", Some(now() - Duration::minutes(2))),
            item("c", Some(now() - Duration::minutes(3))),
        ];
        let (scanner, store, signaler) = scanner_over(items);

        let report = scanner.tick(now()).await.unwrap();

        assert_eq!(report.fired, 3);
        assert_eq!(signaler.fired().len(), 3);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_fires_nothing_and_is_swallowed() {
        let store = Arc::new(FailingSaveStore {
            items: vec![item("due", Some(now()))],
        });
        let signaler = Arc::new(RecordingSignaler::default());
        let collection = Arc::new(ItemCollection::new(store, Arc::new(NoopObserver)));
        let scanner = ReminderScanner::new(collection, signaler.clone());

        assert!(scanner.tick(now()).await.is_err());
        assert_eq!(scanner.run_tick(now()).await, None);
        assert!(signaler.fired().is_empty());
    }

    #[tokio::test]
    async fn test_moved_reminder_fires_again() {
        let overdue = item("moved", Some(now() - Duration::hours(1)));
        let (scanner, store, signaler) = scanner_over(vec![overdue]);
        scanner.tick(now()).await.unwrap();

        let mut items = store.snapshot();
        items[0].remind_at = Some(now() + Duration::minutes(30));
        store.save_all(&items).await.unwrap();

        assert_eq!(scanner.tick(now() + Duration::minutes(10)).await.unwrap().fired, 0);
        assert_eq!(scanner.tick(now() + Duration::minutes(30)).await.unwrap().fired, 1);
        assert_eq!(signaler.fired().len(), 2);
    }
}
