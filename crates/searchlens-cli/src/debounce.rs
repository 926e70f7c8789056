//! Debounced scheduling for hover-triggered lookups
//!
//! A hover only fires after it has persisted for the configured delay;
//! scheduling again within the window supersedes the pending action, and
//! dropping the debouncer cancels it outright, so nothing fires after
//! session teardown.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns at most one pending action. Explicit state in place of an ambient
/// timer handle.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run after `delay`, cancelling any pending one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Cancel the pending action, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
