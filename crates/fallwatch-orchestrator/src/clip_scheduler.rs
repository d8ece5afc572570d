// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! The orchestrator's own fall-observer behavior: scheduling the
//! deferred post-event clip write (spec §4.6, §9).
//!
//! Kept as its own [`FallObserver`] implementation rather than folded
//! into [`crate::Orchestrator`] itself, so the state machine's
//! observer-registration can own it without an `Orchestrator <->
//! DebounceStateMachine` reference cycle; conceptually this *is* "the
//! orchestrator is also a fall-observer" from spec §4.6.

use std::sync::Arc;
use std::time::Duration;

use fallwatch_core::{ClipWriter, EventId, EventStore, FallEvent};
use fallwatch_statemachine::FallObserver;
use tracing::{error, warn};

use crate::timer::TimerRegistry;

/// Schedules a one-shot deferred clip write `clip_after_sec` seconds
/// after a fall is first confirmed, because the clip's forward edge
/// extends into the future (spec §9's "deferred form" decision).
pub struct ClipScheduler {
    buffer: Arc<fallwatch_buffer::RollingBuffer>,
    writer: Arc<dyn ClipWriter>,
    store: Option<Arc<dyn EventStore>>,
    timers: Arc<TimerRegistry>,
    before_sec: f64,
    after_sec: f64,
}

impl ClipScheduler {
    /// Creates a new scheduler. `store`, if given, has its `clip_path`
    /// column filled in once the write lands (spec §6).
    #[must_use]
    pub fn new(
        buffer: Arc<fallwatch_buffer::RollingBuffer>,
        writer: Arc<dyn ClipWriter>,
        store: Option<Arc<dyn EventStore>>,
        timers: Arc<TimerRegistry>,
        before_sec: f64,
        after_sec: f64,
    ) -> Self {
        Self {
            buffer,
            writer,
            store,
            timers,
            before_sec,
            after_sec,
        }
    }

    fn schedule_write(&self, event_id: EventId, confirmed_at: f64) {
        let buffer = Arc::clone(&self.buffer);
        let writer = Arc::clone(&self.writer);
        let store = self.store.clone();
        let before_sec = self.before_sec;
        let after_sec = self.after_sec;

        self.timers.schedule(Duration::from_secs_f64(after_sec.max(0.0)), async move {
            let frames = buffer.get_clip(confirmed_at, before_sec, after_sec);
            if frames.is_empty() {
                warn!(id = %event_id, "clip range empty at deferred write, skipping");
                return;
            }
            match writer.write_clip(&event_id, frames).await {
                Ok(path) => {
                    if let Some(store) = store {
                        if let Err(e) = store.set_clip_path(&event_id, &path).await {
                            error!(id = %event_id, error = %e, "failed to record clip path");
                        }
                    }
                }
                Err(e) => error!(id = %event_id, error = %e, "clip write failed"),
            }
        });
    }
}

impl FallObserver for ClipScheduler {
    fn on_fall_confirmed(&mut self, event: &FallEvent) {
        // Only the first confirmation of an event gets a clip; re-notify
        // fires for the same still-live event and would otherwise queue
        // a redundant deferred write for an overlapping window.
        if event.notification_count == 1 {
            self.schedule_write(event.event_id.clone(), event.confirmed_at);
        }
    }

    fn on_fall_recovered(&mut self, _event: &FallEvent) {}
}
