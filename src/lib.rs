// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Fallwatch, a real-time fall-detection core for home eldercare monitoring.
//!
//! This is the workspace root. See individual crates for documentation:
//!
//! - [`fallwatch_core`] - shared data model, external-interface traits, errors
//! - [`fallwatch_buffer`] - rolling frame buffer
//! - [`fallwatch_smoother`] - adaptive keypoint smoothing (One-Euro filter)
//! - [`fallwatch_rules`] - bbox/pose fall rule engine
//! - [`fallwatch_statemachine`] - three-state debounce machine
//! - [`fallwatch_collector`] - skeleton sequence extraction on suspicion
//! - [`fallwatch_orchestrator`] - per-frame pump and default observers
//!
//! ## Demos
//!
//! ```bash
//! cargo run --example full_stack_demo
//! ```

#![forbid(unsafe_code)]

pub use fallwatch_buffer;
pub use fallwatch_collector;
pub use fallwatch_core;
pub use fallwatch_orchestrator;
pub use fallwatch_rules;
pub use fallwatch_smoother;
pub use fallwatch_statemachine;
