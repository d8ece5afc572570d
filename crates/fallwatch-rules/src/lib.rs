// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! # fallwatch-rules
//!
//! Maps a [`Subject`] to a `fallen: bool`. Two variants, equivalent in
//! interface: a bounding-box aspect-ratio rule and a torso-angle pose
//! rule. Neither variant enforces any temporal logic; that is the
//! debounce state machine's job (`fallwatch-statemachine`).

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use fallwatch_core::Subject;
use fallwatch_smoother::{KeypointSmoother, SmootherConfig};

/// Maps a detected subject to a `fallen` boolean.
///
/// Takes `&mut self` because the pose variant owns smoothing state; the
/// orchestrator holds exactly one `Box<dyn RuleEngine>`, so no further
/// dynamic dispatch is needed past this seam (spec §9).
pub trait RuleEngine: Send {
    /// Evaluates whether `subject`, observed at time `t`, represents a
    /// fallen posture.
    fn is_fallen(&mut self, subject: &Subject, t: f64) -> bool;
}

/// Bounding-box aspect-ratio rule: `fallen iff aspect_ratio <
/// fall_threshold`. A `Subject::None` is never fallen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBoxRule {
    /// Strict aspect-ratio threshold below which a subject is fallen.
    pub fall_threshold: f32,
}

impl BBoxRule {
    /// Creates a new bbox rule with the given threshold.
    #[must_use]
    pub const fn new(fall_threshold: f32) -> Self {
        Self { fall_threshold }
    }
}

impl Default for BBoxRule {
    fn default() -> Self {
        Self::new(1.3)
    }
}

impl RuleEngine for BBoxRule {
    fn is_fallen(&mut self, subject: &Subject, _t: f64) -> bool {
        match subject.as_bbox() {
            Some(bbox) => bbox.aspect_ratio() < self.fall_threshold,
            None => false,
        }
    }
}

/// Torso-angle pose rule: optionally smooths the skeleton first, requires
/// all four torso keypoints visible, then `fallen iff torso_angle >=
/// angle_threshold_deg`.
pub struct PoseRule {
    angle_threshold_deg: f32,
    min_visibility: f32,
    smoother: Option<KeypointSmoother>,
}

impl PoseRule {
    /// Creates a new pose rule without smoothing.
    #[must_use]
    pub const fn new(angle_threshold_deg: f32, min_visibility: f32) -> Self {
        Self {
            angle_threshold_deg,
            min_visibility,
            smoother: None,
        }
    }

    /// Creates a new pose rule that smooths skeletons with the given
    /// configuration before evaluating the rule.
    #[must_use]
    pub fn with_smoothing(
        angle_threshold_deg: f32,
        min_visibility: f32,
        smoother_config: SmootherConfig,
    ) -> Self {
        Self {
            angle_threshold_deg,
            min_visibility,
            smoother: Some(KeypointSmoother::new(smoother_config)),
        }
    }
}

impl Default for PoseRule {
    fn default() -> Self {
        Self::new(60.0, 0.3)
    }
}

impl RuleEngine for PoseRule {
    fn is_fallen(&mut self, subject: &Subject, t: f64) -> bool {
        let Some(skeleton) = subject.as_skeleton() else {
            return false;
        };

        let skeleton = match &mut self.smoother {
            Some(s) => s.smooth(skeleton, t),
            None => *skeleton,
        };

        if !skeleton.torso_visible(self.min_visibility) {
            return false;
        }

        skeleton.torso_angle() >= self.angle_threshold_deg
    }
}
