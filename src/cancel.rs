//! Cooperative cancellation token
//!
//! `tokio-util`'s `CancellationToken` is not part of the teacher's
//! dependency graph; this is a small hand-rolled equivalent, grounded in the
//! pack's own cancellation primitive
//! (`seanchatmangpt-knhk::concurrency::cancel_token`), sized to exactly what
//! the planner's T1-cancels-T2 relationship and the dispatcher's
//! SIGINT/SIGTERM propagation need: one-shot, clonable, observable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Signals cancellation. Idempotent: cancelling twice is a no-op on the
    /// second call.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`Self::cancel`] has been called. Resolves immediately
    /// if cancellation already happened before this call.
    pub async fn cancelled(&self) {
        // Fast path: already cancelled.
        if self.is_cancelled() {
            return;
        }

        let notified = self.notify.notified();

        // Check again after getting the notified future (race condition).
        if self.is_cancelled() {
            return;
        }

        notified.await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
