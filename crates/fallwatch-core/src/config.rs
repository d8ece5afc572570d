// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Configuration surface for the fallwatch core.
//!
//! These structs mirror the minimal core-relevant configuration keys
//! listed in spec §6. Loading them from a file (TOML/YAML/etc.) is an
//! external concern (the config loader lives outside this crate), but
//! each struct is `serde`-round-trippable so an external loader can
//! hydrate it, each carries the spec's documented defaults, and each has
//! a `from_env` helper for reading `FALLWATCH_*` environment overrides
//! without a full config-file loader.

use serde::{Deserialize, Serialize};

/// Which rule-engine variant is in use, and its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Bounding-box aspect-ratio rule.
    Bbox {
        /// `fallen iff aspect_ratio < fall_threshold`.
        fall_threshold: f32,
    },
    /// Torso-angle pose rule.
    Pose {
        /// `fallen iff torso_angle >= angle_threshold_deg`.
        angle_threshold_deg: f32,
    },
}

impl Default for AnalysisMode {
    fn default() -> Self {
        Self::Bbox {
            fall_threshold: 1.3,
        }
    }
}

/// Debounce and analysis timing parameters (spec §4.4.1, §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Which rule variant and threshold to use.
    pub mode: AnalysisMode,
    /// Time the system must remain in `Suspected` before promotion.
    pub delay_sec: f64,
    /// Window after a confirm within which a new confirm folds into the
    /// still-current event.
    pub same_event_window: f64,
    /// Cadence at which `on_fall_confirmed` re-fires while confirmed.
    pub re_notify_interval: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            delay_sec: 3.0,
            same_event_window: 60.0,
            re_notify_interval: 120.0,
        }
    }
}

impl AnalysisConfig {
    /// Builds a config from `FALLWATCH_*` environment variables, falling
    /// back to [`Default::default`] for anything unset or unparseable.
    /// `mode` itself is not overridable this way (it is a tagged union,
    /// not a scalar) and always comes from `Default`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mode: defaults.mode,
            delay_sec: env_f64("FALLWATCH_DELAY_SEC", defaults.delay_sec),
            same_event_window: env_f64("FALLWATCH_SAME_EVENT_WINDOW", defaults.same_event_window),
            re_notify_interval: env_f64("FALLWATCH_RE_NOTIFY_INTERVAL", defaults.re_notify_interval),
        }
    }
}

/// Rolling-buffer / clip-extraction sizing (spec §4.1, §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Width of the rolling buffer's retained window, in seconds.
    pub buffer_seconds: f64,
    /// Seconds of frames to retain before an event time in a clip.
    pub clip_before_sec: f64,
    /// Seconds of frames to retain after an event time in a clip.
    pub clip_after_sec: f64,
    /// Nominal source frame rate, used to size the buffer's entry cap.
    pub fps_nominal: f64,
}

impl RecordingConfig {
    /// Margin added on top of `delay_sec + clip_before_sec +
    /// clip_after_sec` when validating buffer sizing (spec §4.1).
    pub const SIZING_MARGIN_SEC: f64 = 2.0;

    /// Returns `true` if `buffer_seconds` is large enough to guarantee a
    /// complete backward clip given `delay_sec`, per spec §4.1's sizing
    /// rule.
    #[must_use]
    pub fn is_sized_for(&self, delay_sec: f64) -> bool {
        self.buffer_seconds
            >= delay_sec + self.clip_before_sec + self.clip_after_sec + Self::SIZING_MARGIN_SEC
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            buffer_seconds: 15.0,
            clip_before_sec: 5.0,
            clip_after_sec: 5.0,
            fps_nominal: 15.0,
        }
    }
}

impl RecordingConfig {
    /// Builds a config from `FALLWATCH_*` environment variables, falling
    /// back to [`Default::default`] for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            buffer_seconds: env_f64("FALLWATCH_BUFFER_SECONDS", defaults.buffer_seconds),
            clip_before_sec: env_f64("FALLWATCH_CLIP_BEFORE_SEC", defaults.clip_before_sec),
            clip_after_sec: env_f64("FALLWATCH_CLIP_AFTER_SEC", defaults.clip_after_sec),
            fps_nominal: env_f64("FALLWATCH_FPS_NOMINAL", defaults.fps_nominal),
        }
    }
}

/// Pose detection / smoothing configuration (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Whether the pose (skeleton) detector is in use, vs. bbox.
    pub use_pose: bool,
    /// Whether to smooth skeletons before running the rule engine.
    pub enable_smoothing: bool,
    /// One-Euro filter minimum cutoff frequency, in Hz.
    pub smoothing_min_cutoff: f32,
    /// One-Euro filter speed coefficient.
    pub smoothing_beta: f32,
    /// Visibility below which a keypoint's filter state resets.
    pub min_visibility: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            use_pose: false,
            enable_smoothing: true,
            smoothing_min_cutoff: 1.0,
            smoothing_beta: 0.007,
            min_visibility: 0.3,
        }
    }
}

impl DetectionConfig {
    /// Builds a config from `FALLWATCH_*` environment variables, falling
    /// back to [`Default::default`] for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            use_pose: env_bool("FALLWATCH_USE_POSE", defaults.use_pose),
            enable_smoothing: env_bool("FALLWATCH_ENABLE_SMOOTHING", defaults.enable_smoothing),
            smoothing_min_cutoff: env_f32("FALLWATCH_SMOOTHING_MIN_CUTOFF", defaults.smoothing_min_cutoff),
            smoothing_beta: env_f32("FALLWATCH_SMOOTHING_BETA", defaults.smoothing_beta),
            min_visibility: env_f32("FALLWATCH_MIN_VISIBILITY", defaults.min_visibility),
        }
    }
}

/// Post-event skeleton extraction configuration (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Whether the skeleton collector is enabled.
    pub auto_skeleton_extract: bool,
    /// Directory skeleton sequence files are written to.
    pub skeleton_output_dir: std::path::PathBuf,
    /// Number of concurrent background extraction workers.
    pub extraction_workers: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            auto_skeleton_extract: false,
            skeleton_output_dir: std::path::PathBuf::from("./skeletons"),
            extraction_workers: 2,
        }
    }
}

impl LifecycleConfig {
    /// Builds a config from `FALLWATCH_*` environment variables, falling
    /// back to [`Default::default`] for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            auto_skeleton_extract: env_bool("FALLWATCH_AUTO_SKELETON_EXTRACT", defaults.auto_skeleton_extract),
            skeleton_output_dir: std::env::var("FALLWATCH_SKELETON_OUTPUT_DIR")
                .map_or(defaults.skeleton_output_dir, std::path::PathBuf::from),
            extraction_workers: std::env::var("FALLWATCH_EXTRACTION_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.extraction_workers),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recording_config_is_sized_for_defaults() {
        let rec = RecordingConfig::default();
        assert!(rec.is_sized_for(3.0));
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let rec = RecordingConfig {
            buffer_seconds: 5.0,
            ..RecordingConfig::default()
        };
        assert!(!rec.is_sized_for(3.0));
    }

    #[test]
    fn analysis_config_round_trips_json() {
        let cfg = AnalysisConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn env_helpers_fall_back_to_default_when_unset() {
        assert_eq!(env_f64("FALLWATCH_TEST_UNSET_KEY_F64", 42.0), 42.0);
        assert_eq!(env_f32("FALLWATCH_TEST_UNSET_KEY_F32", 1.5), 1.5);
        assert_eq!(env_bool("FALLWATCH_TEST_UNSET_KEY_BOOL", true), true);
    }

    #[test]
    fn env_helpers_parse_set_values() {
        std::env::set_var("FALLWATCH_TEST_SET_KEY_F64", "7.5");
        assert_eq!(env_f64("FALLWATCH_TEST_SET_KEY_F64", 0.0), 7.5);
        std::env::remove_var("FALLWATCH_TEST_SET_KEY_F64");
    }
}
