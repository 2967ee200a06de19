use std::sync::Arc;

use chrono::Local;

use crate::config::AppConfig;
use crate::db::ItemStore;
use crate::notify::{AlertSignaler, DesktopSignaler, EventHub, TrayIndicator};
use crate::services::{ItemCollection, ItemService, ReminderLifecycle, ReminderScanner};
use crate::storage::{ImageStore, SettingsStore};

const EVENT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemService>,
    pub reminders: Arc<ReminderLifecycle<Local>>,
    pub scanner: Arc<ReminderScanner>,
    pub signaler: Arc<dyn AlertSignaler>,
    pub images: ImageStore,
    pub settings: Arc<SettingsStore>,
    pub events: EventHub,
    pub indicator: TrayIndicator,
}

impl AppState {
    /// Wires every service around one shared collection, so the reminder scan and
    /// user edits go through the same writer.
    pub fn new(config: &AppConfig, store: Arc<dyn ItemStore>) -> Self {
        let events = EventHub::new(EVENT_CAPACITY);
        let indicator = TrayIndicator::new(config.flash_interval);
        let signaler: Arc<dyn AlertSignaler> =
            Arc::new(DesktopSignaler::new(events.clone(), indicator.clone()));

        let collection = Arc::new(ItemCollection::new(store, Arc::new(events.clone())));

        Self {
            items: Arc::new(ItemService::new(collection.clone())),
            reminders: Arc::new(ReminderLifecycle::new(
                collection.clone(),
                signaler.clone(),
                Local,
            )),
            scanner: Arc::new(ReminderScanner::new(collection, signaler.clone())),
            signaler,
            images: ImageStore::new(config.images_dir()),
            settings: Arc::new(SettingsStore::new(config.settings_path())),
            events,
            indicator,
        }
    }
}
