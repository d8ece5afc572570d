// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Default fall-observer implementations backed by the external-interface
//! traits from `fallwatch-core` (spec §6).
//!
//! Both observers are thin `tracing`-backed stand-ins: the real event
//! store and notification transport are external collaborators (spec
//! §1). Per spec §4.4.4, observers "must be fast (microseconds) or
//! offload work themselves," and both offload their actual I/O onto the
//! shared `tokio` runtime rather than blocking the detection thread.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use fallwatch_core::{EventStore, FallEvent, NotificationTransport};
use fallwatch_statemachine::FallObserver;
use tracing::error;

fn unix_now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Persists confirmed/recovered events via an [`EventStore`].
///
/// Inserts a new row on first confirmation (`notification_count == 1`)
/// and updates the notification bookkeeping on re-notification
/// (`notification_count > 1`), matching the store schema in spec §6.
pub struct EventLogger {
    store: Arc<dyn EventStore>,
    runtime: tokio::runtime::Handle,
}

impl EventLogger {
    /// Creates a new logger backed by `store`, dispatching writes onto
    /// `runtime`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, runtime: tokio::runtime::Handle) -> Self {
        Self { store, runtime }
    }
}

impl FallObserver for EventLogger {
    fn on_fall_confirmed(&mut self, event: &FallEvent) {
        let store = Arc::clone(&self.store);
        let event = event.clone();
        self.runtime.spawn(async move {
            let result = if event.notification_count <= 1 {
                store.insert(&event).await
            } else {
                store.update_notified(&event).await
            };
            if let Err(e) = result {
                error!(id = %event.event_id, error = %e, "event store write failed");
            }
        });
    }

    fn on_fall_recovered(&mut self, event: &FallEvent) {
        let store = Arc::clone(&self.store);
        let event_id = event.event_id.clone();
        self.runtime.spawn(async move {
            if let Err(e) = store.mark_recovered(&event_id, unix_now_secs()).await {
                error!(id = %event_id, error = %e, "failed to mark event recovered");
            }
        });
    }
}

/// Delivers a push notification on confirmation via a
/// [`NotificationTransport`]. Retry/queue-on-failure semantics belong to
/// the transport itself (spec §6); this observer just dispatches and
/// logs failures.
pub struct PushNotifier {
    transport: Arc<dyn NotificationTransport>,
    runtime: tokio::runtime::Handle,
}

impl PushNotifier {
    /// Creates a new notifier backed by `transport`, dispatching sends
    /// onto `runtime`.
    #[must_use]
    pub fn new(transport: Arc<dyn NotificationTransport>, runtime: tokio::runtime::Handle) -> Self {
        Self { transport, runtime }
    }
}

impl FallObserver for PushNotifier {
    fn on_fall_confirmed(&mut self, event: &FallEvent) {
        let transport = Arc::clone(&self.transport);
        let event = event.clone();
        self.runtime.spawn(async move {
            if let Err(e) = transport.push(&event).await {
                error!(id = %event.event_id, error = %e, "push notification failed");
            }
        });
    }

    fn on_fall_recovered(&mut self, _event: &FallEvent) {
        // Spec §6 only requires push delivery on confirmation/re-notify.
    }
}
