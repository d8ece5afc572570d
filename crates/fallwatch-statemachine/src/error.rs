// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Error type for `fallwatch-statemachine`.
//!
//! The state machine itself cannot fail (spec §4.4.5); invalid
//! transitions are not reachable by construction (see the transition
//! table match in [`crate::machine`]) and observer failures are isolated
//! at the dispatch boundary rather than surfaced here. This type exists
//! for API symmetry with the other crates' per-module error enums.
use thiserror::Error;

/// Reserved for future fallibility; the state machine has no failure
/// modes today.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateMachineError {}
