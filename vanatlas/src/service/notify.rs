//! User-facing alert surface.
//!
//! Every caught error ends up here: logged, then surfaced to the user by
//! whatever the embedding application does with alerts. Nothing retries
//! automatically; a retry is always the user repeating the action.

use std::sync::Mutex;
use tracing::warn;

/// Sink for user-facing alert messages.
pub trait Notifier: Send + Sync {
    /// Surface a blocking alert to the user.
    fn alert(&self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        warn!(alert = message, "User alert");
    }
}

/// Notifier that queues alerts for the embedding UI to drain and display.
#[derive(Debug, Default)]
pub struct BufferedNotifier {
    pending: Mutex<Vec<String>>,
}

impl BufferedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all pending alerts.
    pub fn take(&self) -> Vec<String> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *pending)
    }

    /// Number of queued alerts.
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for BufferedNotifier {
    fn alert(&self, message: &str) {
        warn!(alert = message, "User alert");
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}
