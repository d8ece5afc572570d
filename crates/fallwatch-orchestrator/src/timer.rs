// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! One-shot, cancellable deferred actions (spec §4.6, §9).
//!
//! The deferred clip write is the motivating case: `clip_after_sec`
//! extends into the future, so the write has to happen later than the
//! confirmation itself. Spec §9 prescribes "a simple vector of timer
//! handles," no priority queue is needed because scheduling is
//! first-in-first-out by construction.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

/// Tracks outstanding one-shot timers so they can be cancelled in bulk at
/// shutdown.
pub struct TimerRegistry {
    handle: tokio::runtime::Handle,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TimerRegistry {
    /// Creates a new registry that spawns onto `handle`.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Schedules `action` to run after `delay`. The returned task is
    /// tracked for cancellation; callers do not need to hold on to
    /// anything themselves.
    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        self.handles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(handle);
    }

    /// Cancels every outstanding timer. Deferred actions that have not
    /// yet fired are aborted and never run; actions already running are
    /// left to finish (abort is best-effort against `await` points).
    pub fn cancel_all(&self) {
        let handles = {
            let mut guard = self
                .handles
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        let count = handles.len();
        for handle in handles {
            handle.abort();
        }
        if count > 0 {
            warn!(count, "cancelled outstanding deferred-clip-write timers");
        }
    }

    /// Drops completed handles from the tracking vector to bound its
    /// growth during long-running operation.
    pub fn reap_finished(&self) {
        let mut guard = self
            .handles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.retain(|h| !h.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread")]
    async fn schedule_runs_after_delay() {
        let registry = TimerRegistry::new(tokio::runtime::Handle::current());
        let fired = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&fired);
        registry.schedule(Duration::from_millis(10), async move {
            f.store(true, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancel_all_prevents_pending_action() {
        let registry = TimerRegistry::new(tokio::runtime::Handle::current());
        let fired = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&fired);
        registry.schedule(Duration::from_millis(100), async move {
            f.store(true, Ordering::SeqCst);
        });
        registry.cancel_all();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
