// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! The detector's output shape: a bounding box, a skeleton, or nothing.
//!
//! Modeled as a tagged union (see spec §9 "Subject variant") rather than a
//! class hierarchy, so the rule engine can match on the variant directly
//! with no dynamic dispatch.

/// COCO-17 keypoint names, canonical lowercase `^[a-z_]+$` set, in index
/// order. Used when serializing skeleton sequence files.
pub const COCO17_NAMES: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// Index of the left shoulder keypoint in COCO-17 ordering.
pub const LEFT_SHOULDER: usize = 5;
/// Index of the right shoulder keypoint in COCO-17 ordering.
pub const RIGHT_SHOULDER: usize = 6;
/// Index of the left hip keypoint in COCO-17 ordering.
pub const LEFT_HIP: usize = 11;
/// Index of the right hip keypoint in COCO-17 ordering.
pub const RIGHT_HIP: usize = 12;

/// A detected bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Left edge, in pixels.
    pub x: i32,
    /// Top edge, in pixels.
    pub y: i32,
    /// Width, in pixels.
    pub width: i32,
    /// Height, in pixels.
    pub height: i32,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl BBox {
    /// Creates a new bounding box.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// `height / width`, treated as `0.0` when `width == 0` rather than
    /// producing `inf`/`NaN`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 {
            0.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// A single COCO-17 keypoint: position plus detector-reported visibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// X coordinate in pixels.
    pub x: f32,
    /// Y coordinate in pixels.
    pub y: f32,
    /// Visibility/confidence in `[0, 1]`.
    pub visibility: f32,
}

impl Keypoint {
    /// Creates a new keypoint.
    #[must_use]
    pub const fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    fn midpoint(a: Self, b: Self) -> (f32, f32) {
        ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// A 17-point COCO-ordered skeleton detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skeleton {
    /// Keypoints in COCO-17 order.
    pub keypoints: [Keypoint; 17],
}

impl Skeleton {
    /// Creates a new skeleton from 17 keypoints.
    #[must_use]
    pub const fn new(keypoints: [Keypoint; 17]) -> Self {
        Self { keypoints }
    }

    /// Midpoint of the left and right shoulder keypoints.
    #[must_use]
    pub fn shoulder_center(&self) -> (f32, f32) {
        Keypoint::midpoint(self.keypoints[LEFT_SHOULDER], self.keypoints[RIGHT_SHOULDER])
    }

    /// Midpoint of the left and right hip keypoints.
    #[must_use]
    pub fn hip_center(&self) -> (f32, f32) {
        Keypoint::midpoint(self.keypoints[LEFT_HIP], self.keypoints[RIGHT_HIP])
    }

    /// Vector from the hip center to the shoulder center.
    #[must_use]
    pub fn torso_vector(&self) -> (f32, f32) {
        let (sx, sy) = self.shoulder_center();
        let (hx, hy) = self.hip_center();
        (sx - hx, sy - hy)
    }

    /// Angle between the torso vector and the vertical axis, in degrees,
    /// clamped to `[0, 90]`. `0` is upright, `90` is horizontal.
    #[must_use]
    pub fn torso_angle(&self) -> f32 {
        let (dx, dy) = self.torso_vector();
        if dx == 0.0 && dy == 0.0 {
            return 0.0;
        }
        // Angle of the torso vector from the vertical (negative-y) axis.
        let angle = dx.atan2(-dy).to_degrees().abs();
        angle.min(180.0 - angle).clamp(0.0, 90.0)
    }

    /// Returns `true` if all four torso keypoints (shoulders, hips) meet
    /// `min_visibility`.
    #[must_use]
    pub fn torso_visible(&self, min_visibility: f32) -> bool {
        [LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP]
            .iter()
            .all(|&i| self.keypoints[i].visibility >= min_visibility)
    }
}

/// The detector's output for a single frame: either a bounding box, a
/// skeleton, or nothing (no subject found).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Subject {
    /// A detected bounding box.
    BBox(BBox),
    /// A detected skeleton.
    Skeleton(Skeleton),
    /// No subject detected in this frame.
    None,
}

impl Subject {
    /// Returns the bounding box if this is a `BBox` subject.
    #[must_use]
    pub const fn as_bbox(&self) -> Option<&BBox> {
        match self {
            Self::BBox(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the skeleton if this is a `Skeleton` subject.
    #[must_use]
    pub const fn as_skeleton(&self) -> Option<&Skeleton> {
        match self {
            Self::Skeleton(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_aspect_ratio_zero_width() {
        let b = BBox::new(0, 0, 0, 100, 0.9);
        assert_eq!(b.aspect_ratio(), 0.0);
    }

    #[test]
    fn bbox_aspect_ratio_boundary() {
        // S7: width=100,height=130 -> 1.3 (not fallen at strict <1.3)
        let upright = BBox::new(0, 0, 100, 130, 0.9);
        assert!((upright.aspect_ratio() - 1.3).abs() < 1e-6);

        // width=100,height=129 -> 1.29 (fallen)
        let fallen = BBox::new(0, 0, 100, 129, 0.9);
        assert!(fallen.aspect_ratio() < 1.3);
    }

    fn upright_skeleton() -> Skeleton {
        let mut kps = [Keypoint::new(0.0, 0.0, 1.0); 17];
        kps[LEFT_SHOULDER] = Keypoint::new(45.0, 20.0, 1.0);
        kps[RIGHT_SHOULDER] = Keypoint::new(55.0, 20.0, 1.0);
        kps[LEFT_HIP] = Keypoint::new(45.0, 80.0, 1.0);
        kps[RIGHT_HIP] = Keypoint::new(55.0, 80.0, 1.0);
        Skeleton::new(kps)
    }

    fn fallen_skeleton() -> Skeleton {
        let mut kps = [Keypoint::new(0.0, 0.0, 1.0); 17];
        kps[LEFT_SHOULDER] = Keypoint::new(20.0, 50.0, 1.0);
        kps[RIGHT_SHOULDER] = Keypoint::new(20.0, 60.0, 1.0);
        kps[LEFT_HIP] = Keypoint::new(80.0, 50.0, 1.0);
        kps[RIGHT_HIP] = Keypoint::new(80.0, 60.0, 1.0);
        Skeleton::new(kps)
    }

    #[test]
    fn torso_angle_upright_is_near_zero() {
        let s = upright_skeleton();
        assert!(s.torso_angle() < 15.0, "angle was {}", s.torso_angle());
    }

    #[test]
    fn torso_angle_horizontal_is_near_ninety() {
        let s = fallen_skeleton();
        assert!(s.torso_angle() > 75.0, "angle was {}", s.torso_angle());
    }

    #[test]
    fn torso_visible_requires_all_four() {
        let mut s = upright_skeleton();
        assert!(s.torso_visible(0.3));
        s.keypoints[LEFT_HIP].visibility = 0.1;
        assert!(!s.torso_visible(0.3));
    }

    #[test]
    fn coco17_names_len_matches_keypoints() {
        assert_eq!(COCO17_NAMES.len(), 17);
    }
}
