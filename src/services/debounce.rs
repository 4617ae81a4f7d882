//! Last-wins debouncing.
//!
//! Bursts of triggers within the delay window collapse into a single
//! action run: each trigger aborts the pending timer and starts a new
//! one, so only the most recent trigger's timer ever fires.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Action run when the debounce window elapses without a newer trigger.
pub type DebounceAction = Arc<dyn Fn() + Send + Sync>;

pub struct Debouncer {
    delay: Duration,
    action: DebounceAction,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration, action: DebounceAction) -> Self {
        Self {
            delay,
            action,
            pending: Mutex::new(None),
        }
    }

    /// Schedule the action after the delay, superseding any pending
    /// timer. Must be called from within a tokio runtime.
    pub fn trigger(&self) {
        let mut pending = self.pending.lock().expect("lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let action = self.action.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Drop any pending timer without running the action.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().expect("lock poisoned").take() {
            handle.abort();
        }
    }
}
