use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{Item, Shortcuts};
use crate::notify::ChangeObserver;

/// Events pushed to the desktop shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AppEvent {
    #[serde(rename_all = "camelCase")]
    ItemsChanged { items: Vec<Item> },
    #[serde(rename_all = "camelCase")]
    Reminder {
        item_id: String,
        title: String,
        body: String,
    },
    IndicatorCleared,
    #[serde(rename_all = "camelCase")]
    Notification {
        title: String,
        body: String,
        silent: bool,
        item_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ShortcutsChanged { shortcuts: Shortcuts },
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ItemsChanged { .. } => "itemsChanged",
            AppEvent::Reminder { .. } => "reminder",
            AppEvent::IndicatorCleared => "indicatorCleared",
            AppEvent::Notification { .. } => "notification",
            AppEvent::ShortcutsChanged { .. } => "shortcutsChanged",
        }
    }
}

/// Fan-out of [`AppEvent`]s to every connected listener.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<AppEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: AppEvent) {
        let name = event.name();
        // No listeners is not an error; the shell may not be connected yet.
        match self.sender.send(event) {
            Ok(listeners) => debug!("published {} to {} listeners", name, listeners),
            Err(_) => debug!("published {} with no listeners", name),
        }
    }
}

impl ChangeObserver for EventHub {
    fn notify(&self, items: &[Item]) {
        self.publish(AppEvent::ItemsChanged {
            items: items.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let hub = EventHub::new(8);
        let mut rx = hub.subscribe();

        hub.notify(&[]);
        hub.publish(AppEvent::IndicatorCleared);

        assert_eq!(rx.recv().await.unwrap(), AppEvent::ItemsChanged { items: vec![] });
        assert_eq!(rx.recv().await.unwrap(), AppEvent::IndicatorCleared);
    }

    #[test]
    fn test_publish_without_listeners_is_silent() {
        let hub = EventHub::new(8);
        hub.publish(AppEvent::IndicatorCleared);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = AppEvent::Reminder {
            item_id: "id-1".to_string(),
            title: "Jianji".to_string(),
            body: "Water plants".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["kind"], "reminder");
        assert_eq!(value["itemId"], "id-1");
        assert_eq!(event.name(), "reminder");
    }
}
