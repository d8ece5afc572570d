// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! The three-state debounce machine itself.

use std::panic::{catch_unwind, AssertUnwindSafe};

use fallwatch_core::{FallEvent, Outcome, SuspectedEvent, SuspectedId};
use tracing::{debug, error, info};

use crate::config::DebounceConfig;
use crate::observer::{FallObserver, SuspectedObserver};

/// The three states of the debounce machine (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// No suspected or confirmed fall in progress.
    Normal,
    /// `fallen=true` observed; waiting out `delay_sec` before promotion.
    Suspected,
    /// A fall has been confirmed and has not yet recovered.
    Confirmed,
}

/// Converts a noisy `(fallen, t)` boolean stream into a clean lifecycle
/// of [`FallEvent`] / [`SuspectedEvent`] notifications, exactly per the
/// transition table in spec §4.4.2.
///
/// Single-threaded by design (spec §5): touched only from the detection
/// thread, so no internal locking. Observer registration is append-only
/// and is expected to happen before the first [`update`](Self::update)
/// call.
pub struct DebounceStateMachine {
    config: DebounceConfig,
    state: MachineState,
    suspected_since: f64,
    current_suspected: Option<SuspectedEvent>,
    current_fall: Option<FallEvent>,
    suspected_seq: u64,
    fall_observers: Vec<Box<dyn FallObserver>>,
    suspected_observers: Vec<Box<dyn SuspectedObserver>>,
}

impl DebounceStateMachine {
    /// Creates a new machine in the `Normal` state, with no observers
    /// registered yet.
    #[must_use]
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            state: MachineState::Normal,
            suspected_since: 0.0,
            current_suspected: None,
            current_fall: None,
            suspected_seq: 0,
            fall_observers: Vec::new(),
            suspected_observers: Vec::new(),
        }
    }

    /// Registers a fall-observer. Append-only; call before the first
    /// `update`.
    pub fn add_fall_observer(&mut self, observer: Box<dyn FallObserver>) {
        self.fall_observers.push(observer);
    }

    /// Registers a suspected-observer. Append-only; call before the
    /// first `update`.
    pub fn add_suspected_observer(&mut self, observer: Box<dyn SuspectedObserver>) {
        self.suspected_observers.push(observer);
    }

    /// The machine's current state.
    #[must_use]
    pub fn state(&self) -> MachineState {
        self.state
    }

    /// The currently-live confirmed event, if any. `None` whenever the
    /// machine is not in `Confirmed`. The underlying record may still be
    /// retained internally past recovery for same-event-window bookkeeping
    /// (spec §9), but it is not "current" once recovered.
    #[must_use]
    pub fn current_fall(&self) -> Option<&FallEvent> {
        self.current_fall
            .as_ref()
            .filter(|_| self.state == MachineState::Confirmed)
    }

    /// The currently-live suspected event, if any.
    #[must_use]
    pub fn current_suspected(&self) -> Option<&SuspectedEvent> {
        self.current_suspected.as_ref()
    }

    /// Feeds one `(fallen, t)` sample through the machine, synchronously
    /// dispatching any resulting observer notifications before
    /// returning. `t` must be monotonically non-decreasing across calls
    /// (the orchestrator samples it from a monotonic clock).
    pub fn update(&mut self, fallen: bool, t: f64) {
        match self.state {
            MachineState::Normal => self.update_normal(fallen, t),
            MachineState::Suspected => self.update_suspected(fallen, t),
            MachineState::Confirmed => self.update_confirmed(fallen, t),
        }
    }

    fn update_normal(&mut self, fallen: bool, t: f64) {
        if !fallen {
            return;
        }
        self.suspected_since = t;
        self.suspected_seq += 1;
        let ev = SuspectedEvent::new(SuspectedId::new(t, self.suspected_seq), t);
        debug!(t, id = %ev.suspected_id, "Normal -> Suspected");
        self.dispatch_suspected(&ev);
        self.current_suspected = Some(ev);
        self.state = MachineState::Suspected;
    }

    fn update_suspected(&mut self, fallen: bool, t: f64) {
        if !fallen {
            if let Some(mut ev) = self.current_suspected.take() {
                ev.resolve(Outcome::Cleared, t);
                debug!(t, id = %ev.suspected_id, "Suspected -> Normal (cleared)");
                self.dispatch_cleared(&ev);
            }
            self.state = MachineState::Normal;
            return;
        }

        if t - self.suspected_since < self.config.delay_sec {
            return;
        }

        self.confirm(t);
    }

    fn update_confirmed(&mut self, fallen: bool, t: f64) {
        if !fallen {
            // The record is retained (not cleared to `None`) so a later
            // confirm within `same_event_window` can still merge into it
            // (spec §9's same-event-merge note); `current_fall()` hides
            // it from callers once the machine leaves `Confirmed`.
            if let Some(ev) = self.current_fall.clone() {
                info!(t, id = %ev.event_id, "Confirmed -> Normal (recovered)");
                self.dispatch_recovered(&ev);
            }
            self.current_suspected = None;
            self.state = MachineState::Normal;
            return;
        }

        let Some(ev) = self.current_fall.as_mut() else {
            return;
        };
        if t - ev.last_notified_at >= self.config.re_notify_interval {
            ev.re_notify(t);
            let snapshot = ev.clone();
            info!(
                t,
                id = %snapshot.event_id,
                count = snapshot.notification_count,
                "Confirmed re-notify"
            );
            self.dispatch_confirmed(&snapshot);
        }
    }

    /// The confirmation action of spec §4.4.3: resolves the current
    /// suspected event, applies the same-event merge policy, and fires
    /// (or withholds firing) `on_fall_confirmed` accordingly.
    fn confirm(&mut self, t: f64) {
        let mut resolved = self.current_suspected.take();
        if let Some(ev) = resolved.as_mut() {
            ev.resolve(Outcome::Confirmed, t);
        }

        let merge = self
            .current_fall
            .as_ref()
            .is_some_and(|ev| t - ev.confirmed_at < self.config.same_event_window);

        if merge {
            // Reactivate the retained event untouched: no new id, no
            // fire, but re-notify bookkeeping continues from its
            // original `confirmed_at`/`last_notified_at` (spec §9).
            debug!(t, "Suspected -> Confirmed (same-event merge, no fire)");
        } else {
            let ev = FallEvent::new(t);
            info!(t, id = %ev.event_id, "Suspected -> Confirmed (new event)");
            self.current_fall = Some(ev.clone());
            self.dispatch_confirmed(&ev);
        }

        self.state = MachineState::Confirmed;

        if let Some(ev) = resolved {
            self.dispatch_confirmed_update(&ev);
        }
    }

    fn dispatch_suspected(&mut self, ev: &SuspectedEvent) {
        for (i, obs) in self.suspected_observers.iter_mut().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| obs.on_fall_suspected(ev))).is_err() {
                error!(observer = i, "suspected-observer panicked in on_fall_suspected");
            }
        }
    }

    fn dispatch_cleared(&mut self, ev: &SuspectedEvent) {
        for (i, obs) in self.suspected_observers.iter_mut().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| obs.on_suspicion_cleared(ev))).is_err() {
                error!(observer = i, "suspected-observer panicked in on_suspicion_cleared");
            }
        }
    }

    fn dispatch_confirmed_update(&mut self, ev: &SuspectedEvent) {
        for (i, obs) in self.suspected_observers.iter_mut().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| obs.on_fall_confirmed_update(ev))).is_err() {
                error!(observer = i, "suspected-observer panicked in on_fall_confirmed_update");
            }
        }
    }

    fn dispatch_confirmed(&mut self, ev: &FallEvent) {
        for (i, obs) in self.fall_observers.iter_mut().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| obs.on_fall_confirmed(ev))).is_err() {
                error!(observer = i, "fall-observer panicked in on_fall_confirmed");
            }
        }
    }

    fn dispatch_recovered(&mut self, ev: &FallEvent) {
        for (i, obs) in self.fall_observers.iter_mut().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| obs.on_fall_recovered(ev))).is_err() {
                error!(observer = i, "fall-observer panicked in on_fall_recovered");
            }
        }
    }
}
