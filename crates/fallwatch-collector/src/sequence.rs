// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! The skeleton sequence file shape (spec §6) and its serialization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fallwatch_core::{Skeleton, COCO17_NAMES};
use serde::Serialize;

use crate::config::ExtractorIdentity;

/// `metadata.extractor` block.
#[derive(Debug, Serialize)]
pub struct ExtractorMetadata {
    engine: String,
    model: String,
    version: String,
}

impl From<&ExtractorIdentity> for ExtractorMetadata {
    fn from(id: &ExtractorIdentity) -> Self {
        Self {
            engine: id.engine.clone(),
            model: id.model.clone(),
            version: id.version.clone(),
        }
    }
}

/// Top-level `metadata` block.
#[derive(Debug, Serialize)]
pub struct SequenceMetadata {
    event_id: String,
    timestamp: String,
    source_video: String,
    duration_sec: f64,
    fps: f64,
    total_frames: usize,
    extractor: ExtractorMetadata,
}

/// One frame's normalized keypoints, keyed by COCO-17 name.
#[derive(Debug, Serialize)]
pub struct SequenceFrame {
    frame_index: usize,
    timestamp: f64,
    keypoints: BTreeMap<String, [f32; 3]>,
}

/// The full skeleton sequence file (spec §6).
#[derive(Debug, Serialize)]
pub struct SkeletonSequence {
    metadata: SequenceMetadata,
    keypoint_format: &'static str,
    sequence: Vec<SequenceFrame>,
    version: &'static str,
}

impl SkeletonSequence {
    /// Builds a sequence file from per-frame skeletons paired with their
    /// capture timestamps and the image dimensions used to normalize
    /// coordinates into `[0, 1]`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        event_id: &str,
        wall_clock: DateTime<Utc>,
        source_label: &str,
        fps: f64,
        extractor: &ExtractorIdentity,
        frames: &[(f64, Skeleton, u32, u32)],
    ) -> Self {
        let total_frames = frames.len();
        let duration_sec = match (frames.first(), frames.last()) {
            (Some((first, ..)), Some((last, ..))) => (last - first).max(0.0),
            _ => 0.0,
        };

        let sequence = frames
            .iter()
            .enumerate()
            .map(|(frame_index, (timestamp, skeleton, width, height))| {
                let mut keypoints = BTreeMap::new();
                for (i, name) in COCO17_NAMES.iter().enumerate() {
                    let kp = skeleton.keypoints[i];
                    let x_norm = if *width == 0 { 0.0 } else { kp.x / *width as f32 };
                    let y_norm = if *height == 0 { 0.0 } else { kp.y / *height as f32 };
                    keypoints.insert((*name).to_string(), [x_norm, y_norm, kp.visibility]);
                }
                SequenceFrame {
                    frame_index,
                    timestamp: *timestamp,
                    keypoints,
                }
            })
            .collect();

        Self {
            metadata: SequenceMetadata {
                event_id: event_id.to_string(),
                timestamp: wall_clock.to_rfc3339(),
                source_video: source_label.to_string(),
                duration_sec,
                fps,
                total_frames,
                extractor: extractor.into(),
            },
            keypoint_format: "coco17",
            sequence,
            version: "1.0",
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallwatch_core::Keypoint;

    #[test]
    fn normalizes_coordinates_to_unit_range() {
        let kp = Keypoint::new(100.0, 50.0, 0.9);
        let skeleton = Skeleton::new([kp; 17]);
        let frames = vec![(0.0, skeleton, 200u32, 100u32)];
        let seq = SkeletonSequence::build(
            "susp_1_0",
            Utc::now(),
            "live",
            15.0,
            &ExtractorIdentity::default(),
            &frames,
        );
        let json = seq.to_json().unwrap();
        assert!(json.contains("\"left_shoulder\""));
        assert!(json.contains("\"coco17\""));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let x = value["sequence"][0]["keypoints"]["left_shoulder"][0]
            .as_f64()
            .unwrap();
        assert!((x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_dimension_normalizes_to_zero_not_nan() {
        let kp = Keypoint::new(10.0, 10.0, 1.0);
        let skeleton = Skeleton::new([kp; 17]);
        let frames = vec![(0.0, skeleton, 0u32, 0u32)];
        let seq = SkeletonSequence::build(
            "susp_1_0",
            Utc::now(),
            "live",
            15.0,
            &ExtractorIdentity::default(),
            &frames,
        );
        let json = seq.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let x = value["sequence"][0]["keypoints"]["nose"][0].as_f64().unwrap();
        assert_eq!(x, 0.0);
    }
}
