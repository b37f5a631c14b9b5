//! Cooperative cancellation for long-running range resolution.
//!
//! Resolving a large push means many sequential page fetches from the host. The resolver
//! checks a [`CancellationFlag`] before each fetch, which lets a caller enforce its own
//! timeout by cancelling from another thread.

use std::sync::atomic::{AtomicBool, Ordering};

/// A thread-safe cancellation flag that can be shared across threads.
///
/// The flag starts in a non-cancelled state. Once cancelled it stays cancelled.
#[derive(Debug, Default)]
pub struct CancellationFlag(AtomicBool);

impl CancellationFlag {
    /// Create a new cancellation flag in the non-cancelled state.
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Types that can check for cancellation and return an error if cancelled.
pub trait CancellationPoint {
    /// Return [`Error::Cancelled`](crate::Error::Cancelled) if cancellation was requested.
    fn check(&self) -> Result<(), crate::Error>;
}

impl CancellationPoint for CancellationFlag {
    fn check(&self) -> Result<(), crate::Error> {
        if self.is_cancelled() {
            Err(crate::Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
