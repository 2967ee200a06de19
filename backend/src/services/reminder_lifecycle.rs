use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::error::AppError;
use crate::models::Item;
use crate::notify::AlertSignaler;
use crate::services::collection::{ItemCollection, Mutation};
use crate::services::recurrence::next_occurrence;

/// Applies "stop reminder" to one item.
///
/// One-shot reminders are cleared. Recurring ones advance from the previous due
/// instant, including `weekdays`; the reminder stays armed for the next occurrence.
pub fn acknowledge_item<Tz: TimeZone>(
    item: &mut Item,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<(), AppError> {
    if item.repeat.is_recurring() {
        if let Some(current) = item.remind_at {
            item.remind_at = Some(next_occurrence(current, item.repeat, tz)?);
        }
    } else {
        item.remind_at = None;
    }
    item.updated_at = now;
    Ok(())
}

pub struct ReminderLifecycle<Tz: TimeZone> {
    items: Arc<ItemCollection>,
    signaler: Arc<dyn AlertSignaler>,
    tz: Tz,
}

impl<Tz> ReminderLifecycle<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    pub fn new(items: Arc<ItemCollection>, signaler: Arc<dyn AlertSignaler>, tz: Tz) -> Self {
        Self { items, signaler, tz }
    }

    pub async fn acknowledge(&self, id: &str, now: DateTime<Utc>) -> Result<Item, AppError> {
        let tz = self.tz.clone();
        let item = self
            .items
            .mutate(move |items| {
                let item = items
                    .iter_mut()
                    .find(|item| item.id == id)
                    .ok_or(AppError::NotFound)?;
                acknowledge_item(item, now, &tz)?;
                Ok(Mutation::Changed(item.clone()))
            })
            .await?;

        self.signaler.stop_indicator();

        match item.remind_at {
            Some(next) => info!("reminder {} acknowledged, next at {}", item.id, next),
            None => info!("reminder {} acknowledged and cleared", item.id),
        }
        Ok(item)
    }
}
