// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Debounce timing parameters (spec §4.4.1).

/// Timing parameters for the [`DebounceStateMachine`](crate::DebounceStateMachine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceConfig {
    /// Time the system must remain in `Suspected` before promoting to
    /// `Confirmed`.
    pub delay_sec: f64,
    /// Within this many seconds of a prior confirm, a new confirm is
    /// folded into the still-current event (no new event id, no new
    /// fire).
    pub same_event_window: f64,
    /// While in `Confirmed`, re-fire `on_fall_confirmed` every this many
    /// seconds of continued fallen status.
    pub re_notify_interval: f64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_sec: 3.0,
            same_event_window: 60.0,
            re_notify_interval: 120.0,
        }
    }
}

impl From<fallwatch_core::AnalysisConfig> for DebounceConfig {
    fn from(cfg: fallwatch_core::AnalysisConfig) -> Self {
        Self {
            delay_sec: cfg.delay_sec,
            same_event_window: cfg.same_event_window,
            re_notify_interval: cfg.re_notify_interval,
        }
    }
}
