// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! The two disjoint observer capability sets the state machine notifies.
//!
//! Spec §9 deliberately keeps these two sets separate rather than merging
//! them into a single god-observer: a fall-observer only cares about the
//! confirmed/recovered lifecycle of a [`FallEvent`], a suspected-observer
//! only cares about the suspicion/resolution lifecycle of a
//! [`SuspectedEvent`]. A type implementing both simply implements both
//! traits.

use fallwatch_core::{FallEvent, SuspectedEvent};

/// Notified on the confirmed-fall lifecycle: `on_fall_confirmed` may fire
/// more than once per event (re-notification while the fall persists, see
/// spec §4.4.2's `Confirmed` re-notify row); `on_fall_recovered` fires
/// exactly once, on `Confirmed -> Normal`.
pub trait FallObserver: Send {
    /// A fall was confirmed, or re-notified while still confirmed.
    fn on_fall_confirmed(&mut self, event: &FallEvent);

    /// The subject recovered: the machine returned to `Normal` from
    /// `Confirmed`.
    fn on_fall_recovered(&mut self, event: &FallEvent);
}

/// Notified on the suspected-event lifecycle: `on_fall_suspected` fires
/// once per `Normal -> Suspected` entry, followed by exactly one of
/// `on_suspicion_cleared` or `on_fall_confirmed_update` before another
/// `on_fall_suspected` may fire (spec §8, invariant 3).
pub trait SuspectedObserver: Send {
    /// A new suspicion began.
    fn on_fall_suspected(&mut self, event: &SuspectedEvent);

    /// The suspicion resolved without confirmation (`Suspected ->
    /// Normal`).
    fn on_suspicion_cleared(&mut self, event: &SuspectedEvent);

    /// The suspicion resolved into a confirmed fall (`Suspected ->
    /// Confirmed`). The event handed here is the now-resolved
    /// `SuspectedEvent`, not the new `FallEvent`; this is the hook the
    /// skeleton collector uses to learn the outcome and trigger its
    /// snapshot-then-offload extraction.
    fn on_fall_confirmed_update(&mut self, event: &SuspectedEvent);
}
