// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! # fallwatch-buffer
//!
//! Fixed-duration FIFO of recent timestamped frames, supporting
//! slice-by-time extraction for pre/post-event clip writing.
//!
//! The buffer is shared mutable state: one producer (the orchestrator's
//! detection thread) pushes frames; any number of readers (the skeleton
//! collector, a clip writer) extract slices. A single lock is held for
//! the duration of any push or any slice read; `get_clip` returns a
//! freshly allocated snapshot so readers can process it without holding
//! the lock.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::collections::VecDeque;
use std::sync::Mutex;

use fallwatch_core::Frame;
use thiserror::Error;
use tracing::trace;

/// Errors constructing or operating a [`RollingBuffer`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BufferError {
    /// `window_secs` or `fps_nominal` was not strictly positive.
    #[error("invalid buffer configuration: window_secs={window_secs}, fps_nominal={fps_nominal}")]
    InvalidConfig {
        /// The offending window size.
        window_secs: f64,
        /// The offending nominal frame rate.
        fps_nominal: f64,
    },
}

/// A fixed-duration FIFO of recent timestamped frames.
///
/// Holds at most `ceil(window_secs * fps_nominal)` entries; pushing past
/// capacity evicts the oldest frame. See spec §4.1 for the sizing
/// rationale (`window_secs >= delay_sec + clip_before_sec +
/// clip_after_sec + margin`).
#[derive(Debug)]
pub struct RollingBuffer {
    window_secs: f64,
    max_entries: usize,
    frames: Mutex<VecDeque<Frame>>,
}

impl RollingBuffer {
    /// Creates a new rolling buffer sized to hold `window_secs` seconds of
    /// frames at `fps_nominal` frames/second.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if either parameter is not
    /// strictly positive.
    pub fn new(window_secs: f64, fps_nominal: f64) -> Result<Self, BufferError> {
        if window_secs <= 0.0 || fps_nominal <= 0.0 {
            return Err(BufferError::InvalidConfig {
                window_secs,
                fps_nominal,
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_entries = (window_secs * fps_nominal).ceil() as usize;
        Ok(Self {
            window_secs,
            max_entries: max_entries.max(1),
            frames: Mutex::new(VecDeque::with_capacity(max_entries.max(1))),
        })
    }

    /// The configured retention window, in seconds.
    #[must_use]
    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// The maximum number of entries this buffer retains.
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Appends a frame, evicting the oldest entry if the buffer is now
    /// over capacity.
    pub fn push(&self, frame: Frame) {
        let mut frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
        frames.push_back(frame);
        while frames.len() > self.max_entries {
            frames.pop_front();
        }
        trace!(len = frames.len(), "pushed frame to rolling buffer");
    }

    /// Returns all held frames with `event_time - before_sec <= t <=
    /// event_time + after_sec`, in timestamp order.
    ///
    /// This is a freshly allocated snapshot, not a live view; the caller
    /// may process it without holding the buffer's lock. If
    /// `event_time + after_sec` exceeds the newest held frame, this
    /// returns what is available on the forward side (best-effort); the
    /// backward side is complete as long as `before_sec <= window_secs -
    /// (now - event_time)` at call time (spec §4.1).
    #[must_use]
    pub fn get_clip(&self, event_time: f64, before_sec: f64, after_sec: f64) -> Vec<Frame> {
        let lo = event_time - before_sec;
        let hi = event_time + after_sec;
        let frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
        frames
            .iter()
            .filter(|f| f.timestamp >= lo && f.timestamp <= hi)
            .cloned()
            .collect()
    }

    /// Drops all held frames.
    pub fn clear(&self) {
        let mut frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
        frames.clear();
    }

    /// The number of frames currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if no frames are currently held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
