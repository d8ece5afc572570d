//! Cross-module end-to-end scenarios (spec §8, S1-S5) exercised through
//! the public API only, as an integration suite distinct from the
//! in-module unit tests.

use fallwatch_core::{FallEvent, SuspectedEvent};
use fallwatch_statemachine::{DebounceConfig, DebounceStateMachine, FallObserver, MachineState, SuspectedObserver};
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
struct Counts {
    suspected: Arc<Mutex<u32>>,
    cleared: Arc<Mutex<u32>>,
    confirmed: Arc<Mutex<u32>>,
    confirmed_update: Arc<Mutex<u32>>,
    recovered: Arc<Mutex<u32>>,
}

struct Tap(Counts);

impl FallObserver for Tap {
    fn on_fall_confirmed(&mut self, _event: &FallEvent) {
        *self.0.confirmed.lock().unwrap() += 1;
    }
    fn on_fall_recovered(&mut self, _event: &FallEvent) {
        *self.0.recovered.lock().unwrap() += 1;
    }
}

impl SuspectedObserver for Tap {
    fn on_fall_suspected(&mut self, _event: &SuspectedEvent) {
        *self.0.suspected.lock().unwrap() += 1;
    }
    fn on_suspicion_cleared(&mut self, _event: &SuspectedEvent) {
        *self.0.cleared.lock().unwrap() += 1;
    }
    fn on_fall_confirmed_update(&mut self, _event: &SuspectedEvent) {
        *self.0.confirmed_update.lock().unwrap() += 1;
    }
}

fn machine() -> (DebounceStateMachine, Counts) {
    let counts = Counts::default();
    let mut m = DebounceStateMachine::new(DebounceConfig::default());
    m.add_fall_observer(Box::new(Tap(counts.clone())));
    m.add_suspected_observer(Box::new(Tap(counts.clone())));
    (m, counts)
}

#[test]
fn s1_standing_person_no_event() {
    let (mut m, c) = machine();
    for i in 0..100 {
        m.update(false, f64::from(i) * (1.0 / 15.0));
    }
    assert_eq!(m.state(), MachineState::Normal);
    assert_eq!(*c.suspected.lock().unwrap(), 0);
    assert_eq!(*c.confirmed.lock().unwrap(), 0);
}

#[test]
fn s2_transient_false_alarm() {
    let (mut m, c) = machine();
    let mut t = 0.0;
    while t < 1.0 {
        m.update(true, t);
        t += 1.0 / 15.0;
    }
    let recover_until = t + 5.0;
    while t < recover_until {
        m.update(false, t);
        t += 1.0 / 15.0;
    }
    assert_eq!(*c.suspected.lock().unwrap(), 1);
    assert_eq!(*c.cleared.lock().unwrap(), 1);
    assert_eq!(*c.confirmed.lock().unwrap(), 0);
    assert_eq!(m.state(), MachineState::Normal);
}

#[test]
fn s3_confirmed_fall_then_recovery() {
    let (mut m, c) = machine();
    let mut t = 0.0;
    while t <= 10.0 {
        m.update(true, t);
        t += 1.0 / 15.0;
    }
    assert_eq!(*c.suspected.lock().unwrap(), 1);
    assert_eq!(*c.confirmed.lock().unwrap(), 1);
    assert_eq!(
        m.current_fall().map(|e| e.notification_count),
        Some(1)
    );
    m.update(false, t);
    assert_eq!(*c.recovered.lock().unwrap(), 1);
    assert_eq!(m.state(), MachineState::Normal);
}

#[test]
fn s4_persistent_fall_renotification_count() {
    let (mut m, c) = machine();
    let duration = 250.0;
    let mut t = 0.0;
    while t <= duration {
        m.update(true, t);
        t += 1.0; // coarse tick: fine enough to straddle the 120s re-notify boundaries
    }
    let expected = 1 + ((duration - 3.0) / 120.0).floor() as u32;
    assert_eq!(*c.confirmed.lock().unwrap(), expected);
}

#[test]
fn s5_same_event_merge_does_not_refire() {
    let (mut m, c) = machine();
    m.update(true, 0.0);
    m.update(true, 3.0);
    assert_eq!(*c.confirmed.lock().unwrap(), 1);

    m.update(false, 10.0);
    assert_eq!(*c.recovered.lock().unwrap(), 1);

    m.update(true, 10.5);
    m.update(true, 40.0); // 40 - 3 = 37 < 60: merges, no new fire

    assert_eq!(*c.confirmed.lock().unwrap(), 1, "merge must not re-fire");
    assert_eq!(m.state(), MachineState::Confirmed);
    assert_eq!(
        m.current_fall().map(|e| e.notification_count),
        Some(1),
        "merged event's notification_count must be untouched"
    );
}
