pub mod item;
pub mod settings;

pub use item::{Item, ItemKind, NewItemRequest, ReminderState, Repeat, UpdateItemRequest};
pub use settings::{Settings, Shortcuts, UpdateSettingsRequest};
