use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorStatus {
    pub flashing: bool,
    pub icon_visible: bool,
}

/// Tray icon blink state while a reminder is unacknowledged.
///
/// The shell polls [`TrayIndicator::status`] and draws the icon accordingly.
/// Flashing must be started from inside a Tokio runtime.
#[derive(Clone)]
pub struct TrayIndicator {
    period: Duration,
    icon_visible: Arc<AtomicBool>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TrayIndicator {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            icon_visible: Arc::new(AtomicBool::new(true)),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts blinking. A second call while already blinking does nothing.
    pub fn start_flashing(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.is_some() {
            return;
        }

        let icon_visible = Arc::clone(&self.icon_visible);
        let period = self.period;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                icon_visible.fetch_xor(true, Ordering::SeqCst);
            }
        }));
        debug!("tray indicator flashing");
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
            debug!("tray indicator stopped");
        }
        self.icon_visible.store(true, Ordering::SeqCst);
    }

    pub fn status(&self) -> IndicatorStatus {
        IndicatorStatus {
            flashing: self.task.lock().unwrap_or_else(|e| e.into_inner()).is_some(),
            icon_visible: self.icon_visible.load(Ordering::SeqCst),
        }
    }
}
