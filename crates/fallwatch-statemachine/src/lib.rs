// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! # fallwatch-statemachine
//!
//! The three-state debounce machine that turns a noisy per-frame
//! `fallen: bool` stream into a clean lifecycle of fall events, with
//! dual-phase observer notification (spec §4.4).
//!
//! - [`MachineState`]: `Normal` / `Suspected` / `Confirmed`.
//! - [`DebounceStateMachine`]: owns the current [`fallwatch_core::FallEvent`]
//!   and [`fallwatch_core::SuspectedEvent`], if any, and drives the
//!   transition table exactly as specified.
//! - [`FallObserver`] / [`SuspectedObserver`]: the two disjoint observer
//!   capability sets.
//!
//! The machine cannot itself fail (spec §4.4.5): an observer panic is
//! caught at the dispatch boundary, logged, and does not prevent
//! subsequent observers from running or mutate the machine's own state.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

mod config;
mod error;
mod machine;
mod observer;

pub use config::DebounceConfig;
pub use error::StateMachineError;
pub use machine::{DebounceStateMachine, MachineState};
pub use observer::{FallObserver, SuspectedObserver};

#[cfg(test)]
mod tests {
    use super::*;
    use fallwatch_core::{FallEvent, SuspectedEvent};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder {
        confirmed: Arc<Mutex<Vec<FallEvent>>>,
        recovered: Arc<Mutex<Vec<FallEvent>>>,
        suspected: Arc<Mutex<Vec<SuspectedEvent>>>,
        cleared: Arc<Mutex<Vec<SuspectedEvent>>>,
        confirmed_update: Arc<Mutex<Vec<SuspectedEvent>>>,
    }

    struct FallTap(Recorder);
    impl FallObserver for FallTap {
        fn on_fall_confirmed(&mut self, event: &FallEvent) {
            self.0.confirmed.lock().unwrap().push(event.clone());
        }
        fn on_fall_recovered(&mut self, event: &FallEvent) {
            self.0.recovered.lock().unwrap().push(event.clone());
        }
    }

    struct SuspectedTap(Recorder);
    impl SuspectedObserver for SuspectedTap {
        fn on_fall_suspected(&mut self, event: &SuspectedEvent) {
            self.0.suspected.lock().unwrap().push(event.clone());
        }
        fn on_suspicion_cleared(&mut self, event: &SuspectedEvent) {
            self.0.cleared.lock().unwrap().push(event.clone());
        }
        fn on_fall_confirmed_update(&mut self, event: &SuspectedEvent) {
            self.0.confirmed_update.lock().unwrap().push(event.clone());
        }
    }

    fn wired() -> (DebounceStateMachine, Recorder) {
        let rec = Recorder::default();
        let mut m = DebounceStateMachine::new(DebounceConfig::default());
        m.add_fall_observer(Box::new(FallTap(rec.clone())));
        m.add_suspected_observer(Box::new(SuspectedTap(rec.clone())));
        (m, rec)
    }

    /// S1: standing person, no event.
    #[test]
    fn s1_no_transitions_no_calls() {
        let (mut m, rec) = wired();
        for i in 0..100 {
            m.update(false, f64::from(i) / 15.0);
        }
        assert_eq!(m.state(), MachineState::Normal);
        assert!(rec.suspected.lock().unwrap().is_empty());
        assert!(rec.confirmed.lock().unwrap().is_empty());
    }

    /// S2: transient false alarm, suspected then cleared, never confirmed.
    #[test]
    fn s2_transient_false_alarm() {
        let (mut m, rec) = wired();
        m.update(true, 0.0);
        m.update(true, 0.5);
        m.update(true, 1.0);
        for i in 0..75 {
            m.update(false, 1.0 + f64::from(i) / 15.0);
        }
        assert_eq!(m.state(), MachineState::Normal);
        assert_eq!(rec.suspected.lock().unwrap().len(), 1);
        assert_eq!(rec.cleared.lock().unwrap().len(), 1);
        assert!(rec.confirmed.lock().unwrap().is_empty());
    }

    /// S3: confirmed fall then recovery.
    #[test]
    fn s3_confirmed_then_recovered() {
        let (mut m, rec) = wired();
        let mut t = 0.0;
        while t <= 10.0 {
            m.update(true, t);
            t += 1.0 / 15.0;
        }
        assert_eq!(m.state(), MachineState::Confirmed);
        assert_eq!(rec.suspected.lock().unwrap().len(), 1);
        let confirmed = rec.confirmed.lock().unwrap().clone();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].event_id.as_str(), "evt_3");
        assert_eq!(confirmed[0].notification_count, 1);

        m.update(false, 10.0 + 1.0 / 15.0);
        assert_eq!(m.state(), MachineState::Normal);
        assert_eq!(rec.recovered.lock().unwrap().len(), 1);
    }

    /// S4: persistent fall with re-notification.
    #[test]
    fn s4_persistent_fall_renotifies() {
        let (mut m, rec) = wired();
        // Drive the stream at coarse ticks; only the boundary crossings matter here.
        let ticks = [0.0, 3.0, 123.0, 243.0, 250.0];
        for &t in &ticks {
            m.update(true, t);
        }
        let confirmed = rec.confirmed.lock().unwrap().clone();
        assert_eq!(confirmed.len(), 3);
        assert_eq!(confirmed[0].notification_count, 1);
        assert_eq!(confirmed[1].notification_count, 2);
        assert_eq!(confirmed[2].notification_count, 3);
        assert_eq!(confirmed[0].last_notified_at, 3.0);
        assert_eq!(confirmed[1].last_notified_at, 123.0);
        assert_eq!(confirmed[2].last_notified_at, 243.0);
    }

    /// S5: same-event merge, a confirm within `same_event_window` of a
    /// prior confirm does not create a new event or fire.
    #[test]
    fn s5_same_event_merge() {
        let (mut m, rec) = wired();
        m.update(true, 0.0);
        m.update(true, 3.0); // confirm #1 at t=3
        m.update(false, 10.0); // recover
        m.update(true, 10.5); // re-suspect
        m.update(true, 40.0); // would confirm again at t=40 (40-3=37 < 60)

        let confirmed = rec.confirmed.lock().unwrap().clone();
        assert_eq!(confirmed.len(), 1, "merge must not re-fire on_fall_confirmed");
        assert_eq!(confirmed[0].notification_count, 1);
        assert_eq!(m.state(), MachineState::Confirmed);

        // The suspected-observer still learns of the second resolution.
        assert_eq!(rec.confirmed_update.lock().unwrap().len(), 2);
    }

    #[test]
    fn observer_panic_is_isolated() {
        struct Panicker;
        impl FallObserver for Panicker {
            fn on_fall_confirmed(&mut self, _event: &FallEvent) {
                panic!("boom");
            }
            fn on_fall_recovered(&mut self, _event: &FallEvent) {}
        }

        let rec = Recorder::default();
        let mut m = DebounceStateMachine::new(DebounceConfig::default());
        m.add_fall_observer(Box::new(Panicker));
        m.add_fall_observer(Box::new(FallTap(rec.clone())));

        m.update(true, 0.0);
        m.update(true, 3.0);

        // The second observer still ran despite the first panicking.
        assert_eq!(rec.confirmed.lock().unwrap().len(), 1);
        assert_eq!(m.state(), MachineState::Confirmed);
    }

    #[test]
    fn suspected_cleared_is_exclusive_with_confirmed_update() {
        let (mut m, rec) = wired();
        m.update(true, 0.0);
        m.update(false, 0.5);
        assert_eq!(rec.cleared.lock().unwrap().len(), 1);
        assert!(rec.confirmed_update.lock().unwrap().is_empty());
    }
}
