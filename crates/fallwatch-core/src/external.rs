// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Trait boundaries for external collaborators.
//!
//! Spec §1 treats the detection model, notification transport, persistent
//! event store, clip encoder, cloud uploader, retention sweeper,
//! configuration loader, dashboard, and CLI as external collaborators,
//! "specified only at their interface," and these traits are that
//! interface, grounded on the same async-trait-based backend abstraction
//! pattern
//! used elsewhere in this style of codebase to decouple core logic from a
//! specific display-server/camera/transport implementation.

use async_trait::async_trait;

use crate::error::{DetectorError, SourceError};
use crate::event::{EventId, FallEvent};
use crate::frame::{Frame, FramePixels};
use crate::subject::Subject;

/// Yields timestamped frames from a camera or file. External to this
/// crate; implementations live in the embedding application.
#[async_trait]
pub trait FrameSource: Send {
    /// Reads the next frame, or `None` at end-of-stream (e.g. a file
    /// source that has been fully consumed).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TransientRead`] for a single dropped frame
    /// (the orchestrator may retry) and [`SourceError::Fatal`] once the
    /// source's own retry budget is exhausted.
    async fn next_frame(&mut self) -> Result<Option<(f64, FramePixels)>, SourceError>;
}

/// Given a frame, returns zero or one subject. External to this crate;
/// implementations wrap a pose or bbox inference model.
#[async_trait]
pub trait Detector: Send {
    /// Runs detection on a single frame's pixels.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Inference`] when the underlying model
    /// invocation fails; per spec §7 the orchestrator treats this the
    /// same as `Subject::None` for that frame rather than propagating it.
    async fn detect(&mut self, pixels: &FramePixels) -> Result<Subject, DetectorError>;
}

/// Persists fall events to a row-oriented table (spec §6). External to
/// this crate: the schema and storage engine belong to the embedding
/// application.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts a newly-confirmed event row.
    async fn insert(&self, event: &FallEvent) -> crate::error::Result<()>;

    /// Updates the notification count / timestamp for a re-notification.
    async fn update_notified(&self, event: &FallEvent) -> crate::error::Result<()>;

    /// Marks an event row recovered at the given time.
    async fn mark_recovered(&self, event_id: &EventId, recovered_at: f64) -> crate::error::Result<()>;

    /// Fills in the clip path once the deferred clip write lands.
    async fn set_clip_path(&self, event_id: &EventId, clip_path: &std::path::Path) -> crate::error::Result<()>;
}

/// Delivers a push notification for a confirmed fall (spec §6). External
/// to this crate: retry/queue-on-failure semantics belong to the
/// notifier, not the core.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Sends a push notification describing the event.
    async fn push(&self, event: &FallEvent) -> crate::error::Result<()>;
}

/// Encodes and writes a clip for a confirmed event (spec §6). External to
/// this crate: the encoder and file format are an external concern.
#[async_trait]
pub trait ClipWriter: Send + Sync {
    /// Encodes `frames` into a clip file and returns its path.
    async fn write_clip(
        &self,
        event_id: &EventId,
        frames: Vec<Frame>,
    ) -> crate::error::Result<std::path::PathBuf>;
}
