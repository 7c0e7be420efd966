//! Handle for cancelling a running match.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle for interacting with a running match.
///
/// Clones share the same flags. Cancellation is cooperative: the run
/// observes the flag between enumeration steps and every few hundred
/// search decisions, then ends with `MatchOutcome::Cancelled`.
#[derive(Clone, Default)]
pub struct MatchHandle {
    /// Flag indicating whether the run is executing.
    running: Arc<AtomicBool>,
    /// Flag to request cancellation.
    cancel: Arc<AtomicBool>,
}

impl MatchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the run.
    ///
    /// Has no effect once the run has ended.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sets the running state (used internally by the manager).
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// The shared cancellation flag, polled by the driver.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }
}

impl Debug for MatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchHandle")
            .field("running", &self.is_running())
            .field("cancel_requested", &self.is_cancel_requested())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flags() {
        let handle = MatchHandle::new();
        let clone = handle.clone();

        clone.set_running(true);
        assert!(handle.is_running());

        handle.request_cancel();
        assert!(clone.is_cancel_requested());
        assert!(clone.cancel_flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_debug_shows_state() {
        let handle = MatchHandle::new();
        let text = format!("{:?}", handle);
        assert!(text.contains("running: false"));
        assert!(text.contains("cancel_requested: false"));
    }
}
