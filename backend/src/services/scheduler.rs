use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::services::reminder_scanner::ReminderScanner;

/// Reminder scheduler.
/// Runs a reminder scan every `interval` until the task is aborted.
pub struct ReminderScheduler {
    scanner: Arc<ReminderScanner>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(scanner: Arc<ReminderScanner>, interval: Duration) -> Self {
        Self { scanner, interval }
    }

    /// Scans in an endless loop. Failed ticks are logged by the scanner and the
    /// loop carries on.
    pub async fn start(self) {
        info!("Starting reminder scheduler (interval: {:?})", self.interval);

        loop {
            // Wait first, like a plain interval timer.
            tokio::time::sleep(self.interval).await;

            self.scanner.run_tick(Utc::now()).await;
        }
    }

    /// Starts the loop on the runtime; abort the handle to stop it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.start())
    }
}
