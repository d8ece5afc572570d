// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Fall-event and suspected-event lifecycle records.
//!
//! These types are created and mutated exclusively by the debounce state
//! machine (`fallwatch-statemachine`); this crate only defines their shape
//! and read-only accessors so that other crates (the collector, the
//! orchestrator's observers) can consume them without depending on the
//! state machine crate.

use std::sync::Arc;

/// Unique identifier for a confirmed fall event.
///
/// A newtype around `Arc<str>` for cheap cloning, mirroring how session
/// identifiers are represented elsewhere in this style of codebase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(Arc<str>);

impl EventId {
    /// Creates an event id from the confirmation timestamp, per spec:
    /// `"evt_" + floor(t)`.
    #[must_use]
    pub fn from_confirmed_at(t: f64) -> Self {
        Self(format!("evt_{}", t.floor() as i64).into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a suspected event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuspectedId(Arc<str>);

impl SuspectedId {
    /// Creates a suspected-event id from the suspicion timestamp:
    /// `"susp_" + floor(t)` with a monotonic disambiguator appended by the
    /// caller when two suspicions could otherwise collide within the same
    /// second.
    #[must_use]
    pub fn new(t: f64, seq: u64) -> Self {
        Self(format!("susp_{}_{seq}", t.floor() as i64).into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SuspectedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A confirmed fall event.
///
/// Created on the first `Normal -> Confirmed` transition not folded into a
/// still-live prior event (the same-event merge, see spec §4.4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct FallEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// Monotonic time this event was first confirmed.
    pub confirmed_at: f64,
    /// Monotonic time of the most recent `on_fall_confirmed` fire
    /// (including re-notifications).
    pub last_notified_at: f64,
    /// Number of times `on_fall_confirmed` has fired for this event.
    /// Always `>= 1`.
    pub notification_count: u32,
}

impl FallEvent {
    /// Creates a new fall event at first confirmation.
    #[must_use]
    pub fn new(confirmed_at: f64) -> Self {
        Self {
            event_id: EventId::from_confirmed_at(confirmed_at),
            confirmed_at,
            last_notified_at: confirmed_at,
            notification_count: 1,
        }
    }

    /// Records a re-notification at time `t`.
    ///
    /// Public so `fallwatch-statemachine` (the sole owner of these
    /// events' lifecycle, per spec §3) can mutate them; not meant to be
    /// called from anywhere else.
    pub fn re_notify(&mut self, t: f64) {
        self.last_notified_at = t;
        self.notification_count += 1;
    }
}

/// Resolution of a suspected event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Still unresolved; the machine is in `Suspected`.
    Pending,
    /// Promoted to `Confirmed`.
    Confirmed,
    /// Returned to `Normal` without confirmation.
    Cleared,
}

/// A suspected event: created on `Normal -> Suspected`, resolved on exit
/// from `Suspected` either way.
#[derive(Debug, Clone, PartialEq)]
pub struct SuspectedEvent {
    /// Unique suspected-event identifier.
    pub suspected_id: SuspectedId,
    /// Monotonic time suspicion began.
    pub suspected_at: f64,
    /// Resolution outcome.
    pub outcome: Outcome,
    /// Monotonic time the outcome was set, if resolved.
    pub outcome_at: Option<f64>,
}

impl SuspectedEvent {
    /// Creates a new pending suspected event.
    #[must_use]
    pub fn new(suspected_id: SuspectedId, suspected_at: f64) -> Self {
        Self {
            suspected_id,
            suspected_at,
            outcome: Outcome::Pending,
            outcome_at: None,
        }
    }

    /// Resolves the outcome of this suspected event.
    ///
    /// Public so `fallwatch-statemachine` can mutate it on resolution;
    /// not meant to be called from anywhere else.
    pub fn resolve(&mut self, outcome: Outcome, t: f64) {
        self.outcome = outcome;
        self.outcome_at = Some(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_format() {
        let id = EventId::from_confirmed_at(3.7);
        assert_eq!(id.as_str(), "evt_3");
    }

    #[test]
    fn fall_event_starts_at_count_one() {
        let ev = FallEvent::new(3.0);
        assert_eq!(ev.notification_count, 1);
        assert_eq!(ev.last_notified_at, 3.0);
    }

    #[test]
    fn fall_event_re_notify_increments() {
        let mut ev = FallEvent::new(3.0);
        ev.re_notify(123.0);
        assert_eq!(ev.notification_count, 2);
        assert_eq!(ev.last_notified_at, 123.0);
    }

    #[test]
    fn suspected_event_resolve_sets_outcome() {
        let mut ev = SuspectedEvent::new(SuspectedId::new(1.0, 0), 1.0);
        assert_eq!(ev.outcome, Outcome::Pending);
        ev.resolve(Outcome::Cleared, 5.0);
        assert_eq!(ev.outcome, Outcome::Cleared);
        assert_eq!(ev.outcome_at, Some(5.0));
    }
}
