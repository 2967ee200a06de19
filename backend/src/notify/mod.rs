pub mod events;
pub mod indicator;

use tracing::info;

use crate::models::Item;

pub use events::{AppEvent, EventHub};
pub use indicator::{IndicatorStatus, TrayIndicator};

/// Notification title used when none is given.
pub const APP_TITLE: &str = "Jianji";

/// User-visible alerting. Calls are fire-and-forget.
pub trait AlertSignaler: Send + Sync {
    fn fire(&self, item: &Item);
    fn stop_indicator(&self);
}

/// Receives the full collection after every successful mutation.
pub trait ChangeObserver: Send + Sync {
    fn notify(&self, items: &[Item]);
}

/// Desktop alerting: blinks the tray icon and pushes a reminder event to the shell.
pub struct DesktopSignaler {
    hub: EventHub,
    indicator: TrayIndicator,
}

impl DesktopSignaler {
    pub fn new(hub: EventHub, indicator: TrayIndicator) -> Self {
        Self { hub, indicator }
    }
}

impl AlertSignaler for DesktopSignaler {
    fn fire(&self, item: &Item) {
        info!("reminder due: {} ({})", item.title, item.id);
        self.indicator.start_flashing();
        self.hub.publish(AppEvent::Reminder {
            item_id: item.id.clone(),
            title: APP_TITLE.to_string(),
            body: item.reminder_body(),
        });
    }

    fn stop_indicator(&self) {
        self.indicator.stop();
        self.hub.publish(AppEvent::IndicatorCleared);
    }
}

pub struct NoopObserver;

impl ChangeObserver for NoopObserver {
    fn notify(&self, _items: &[Item]) {}
}
