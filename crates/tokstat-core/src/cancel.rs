//! Cooperative cancellation for scans
//!
//! Scans poll the flag between files and between lines. Clones share state,
//! so a caller can hand one clone to a signal handler and another to the
//! orchestrator.

use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation signal
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
    // Polls left before the flag trips on its own
    #[cfg(test)]
    trip_after: Option<Arc<AtomicUsize>>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every scan observing this flag
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        #[cfg(test)]
        if let Some(polls) = &self.trip_after
            && polls
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
        {
            self.cancel();
        }
        self.cancelled.load(Ordering::SeqCst)
    }

    /// A flag that reports cancellation from its `polls + 1`th check on
    #[cfg(test)]
    pub(crate) fn tripping_after(polls: usize) -> Self {
        Self {
            trip_after: Some(Arc::new(AtomicUsize::new(polls))),
            ..Self::default()
        }
    }
}
