// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Synthetic `FrameSource`/`Detector` pair used when no real camera or
//! pose model is wired in, so the binary has something runnable out of
//! the box (spec's "demo frame source/detector" role for this crate).

use async_trait::async_trait;
use fallwatch_core::error::{DetectorError, SourceError};
use fallwatch_core::{BBox, FramePixels, Subject};

/// Yields blank frames at a fixed nominal frame rate for `duration_sec`
/// seconds, then ends the stream.
pub struct DemoSource {
    fps: f64,
    frame_index: u64,
    total_frames: u64,
}

impl DemoSource {
    /// Creates a new demo source running for `duration_sec` seconds at
    /// `fps` frames/second.
    #[must_use]
    pub fn new(fps: f64, duration_sec: f64) -> Self {
        Self {
            fps,
            frame_index: 0,
            total_frames: (fps * duration_sec).max(0.0) as u64,
        }
    }
}

#[async_trait]
impl fallwatch_core::FrameSource for DemoSource {
    async fn next_frame(&mut self) -> Result<Option<(f64, FramePixels)>, SourceError> {
        if self.frame_index >= self.total_frames {
            return Ok(None);
        }
        let t = self.frame_index as f64 / self.fps;
        self.frame_index += 1;
        Ok(Some((t, FramePixels::new(2, 2, vec![0u8; 12]))))
    }
}

/// Reports an upright bounding box for most of the run and a collapsed
/// one for a short window partway through, so a default run of
/// `fallwatch run` actually produces a confirmed event to observe.
pub struct DemoDetector {
    fps: f64,
    frame_index: u64,
    fall_window: (f64, f64),
}

impl DemoDetector {
    /// Creates a new demo detector that scripts a fall between
    /// `fall_window.0` and `fall_window.1` seconds into the run.
    #[must_use]
    pub fn new(fps: f64, fall_window: (f64, f64)) -> Self {
        Self {
            fps,
            frame_index: 0,
            fall_window,
        }
    }
}

#[async_trait]
impl fallwatch_core::Detector for DemoDetector {
    async fn detect(&mut self, _pixels: &FramePixels) -> Result<Subject, DetectorError> {
        let t = self.frame_index as f64 / self.fps;
        self.frame_index += 1;
        let bbox = if t >= self.fall_window.0 && t <= self.fall_window.1 {
            BBox::new(100, 400, 220, 90, 0.9) // collapsed: aspect < 1.3
        } else {
            BBox::new(100, 100, 180, 420, 0.95) // upright
        };
        Ok(Subject::BBox(bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallwatch_core::{Detector, FrameSource};

    #[tokio::test]
    async fn demo_source_ends_after_duration() {
        let mut source = DemoSource::new(10.0, 0.5);
        let mut count = 0;
        while source.next_frame().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn demo_detector_scripts_fall_window() {
        let mut detector = DemoDetector::new(10.0, (0.2, 0.4));
        let pixels = FramePixels::new(2, 2, vec![0u8; 12]);

        let upright = detector.detect(&pixels).await.unwrap(); // t=0.0
        assert!(!matches!(upright, Subject::BBox(b) if b.aspect_ratio() < 1.3));

        for _ in 0..2 {
            detector.detect(&pixels).await.unwrap(); // t=0.1, t=0.2
        }
        let fallen = detector.detect(&pixels).await.unwrap(); // t=0.3
        assert!(matches!(fallen, Subject::BBox(b) if b.aspect_ratio() < 1.3));
    }
}
