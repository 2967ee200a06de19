pub mod collection;
pub mod item_service;
pub mod recurrence;
pub mod reminder_lifecycle;
pub mod reminder_scanner;
pub mod scheduler;

pub use collection::{ItemCollection, Mutation};
pub use item_service::ItemService;
pub use recurrence::next_occurrence;
pub use reminder_lifecycle::{ReminderLifecycle, acknowledge_item};
pub use reminder_scanner::{ReminderScanner, ScanReport, mark_due};
pub use scheduler::ReminderScheduler;
