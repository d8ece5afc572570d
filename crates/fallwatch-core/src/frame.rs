// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Timestamped frame types.
//!
//! A [`Frame`] pairs a monotonic capture timestamp with a cheaply-clonable
//! pixel payload. Frames are owned by the rolling buffer once pushed and
//! may be shallow-copied out by any reader (the skeleton collector, a clip
//! writer) without re-allocating the pixel data.

use std::sync::Arc;

/// Raw pixel payload for a captured frame: `width x height`, 8-bit, 3
/// channels (RGB), row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed RGB8 pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl FramePixels {
    /// Creates a new pixel buffer, panicking in debug builds if `data`'s
    /// length does not match `width * height * 3`.
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * 3,
            "frame pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            data,
        }
    }
}

/// An immutable, timestamped frame.
///
/// `timestamp` is seconds from a monotonic clock sampled on the detection
/// thread, strictly increasing across successive pushes to the rolling
/// buffer. Cloning a `Frame` is a reference-count bump on the pixel
/// payload, not a pixel copy.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic capture time, in seconds.
    pub timestamp: f64,
    /// Pixel payload, shared by reference.
    pub pixels: Arc<FramePixels>,
}

impl Frame {
    /// Creates a new frame at the given monotonic timestamp.
    #[must_use]
    pub fn new(timestamp: f64, pixels: FramePixels) -> Self {
        Self {
            timestamp,
            pixels: Arc::new(pixels),
        }
    }

    /// Creates a new frame from an already-shared pixel payload.
    #[must_use]
    pub fn from_arc(timestamp: f64, pixels: Arc<FramePixels>) -> Self {
        Self { timestamp, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_cheap_reference_bump() {
        let frame = Frame::new(1.0, FramePixels::new(2, 2, vec![0u8; 12]));
        let clone = frame.clone();
        assert_eq!(Arc::strong_count(&frame.pixels), 2);
        assert_eq!(clone.timestamp, 1.0);
    }
}
