// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Collector configuration (spec §4.5, §6).

use std::path::PathBuf;

/// Identifies the external pose engine used for post-event extraction,
/// recorded verbatim in each skeleton sequence file's `metadata.extractor`
/// block (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorIdentity {
    /// Engine name, e.g. `"fallwatch-pose"`.
    pub engine: String,
    /// Model identifier/filename.
    pub model: String,
    /// Model or engine version string.
    pub version: String,
}

impl Default for ExtractorIdentity {
    fn default() -> Self {
        Self {
            engine: "fallwatch-pose".to_string(),
            model: "external".to_string(),
            version: "0.0.0".to_string(),
        }
    }
}

/// Configuration for the [`crate::SkeletonCollector`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Whether the collector is enabled at all
    /// (`lifecycle.auto_skeleton_extract`). When disabled, observer hooks
    /// are still safe to call but perform no extraction.
    pub enabled: bool,
    /// Seconds of buffered frames to retain before the suspicion time.
    pub before_sec: f64,
    /// Seconds of buffered frames to retain after the suspicion time.
    pub after_sec: f64,
    /// Directory skeleton sequence files are written to.
    pub output_dir: PathBuf,
    /// Maximum number of extractions running concurrently. Additional
    /// submissions queue rather than block the calling (detection)
    /// thread or get dropped.
    pub max_concurrent_extractions: usize,
    /// Nominal source frame rate, recorded in each sequence file's
    /// metadata.
    pub fps_nominal: f64,
    /// Label for the source video/stream, recorded in metadata.
    pub source_label: String,
    /// Identity of the pose engine used for extraction.
    pub extractor: ExtractorIdentity,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            before_sec: 5.0,
            after_sec: 5.0,
            output_dir: PathBuf::from("./skeletons"),
            max_concurrent_extractions: 2,
            fps_nominal: 15.0,
            source_label: "live".to_string(),
            extractor: ExtractorIdentity::default(),
        }
    }
}
