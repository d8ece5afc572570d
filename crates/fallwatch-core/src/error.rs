// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Error types for fallwatch-core.
//!
//! Uses `thiserror` for ergonomic error definitions with zero runtime overhead.

use thiserror::Error;

/// Result type alias for fallwatch-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the boundary between fallwatch and its
/// external collaborators (frame source, detector, event store,
/// notification transport, clip encoder).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The frame source failed after exhausting its retry budget.
    #[error("frame source error: {0}")]
    Source(#[from] SourceError),

    /// The detector raised an error for a single frame.
    ///
    /// Per the disposition table, this is recoverable: callers should
    /// treat the frame as having no subject and continue.
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),

    /// Persisting or updating an event row failed.
    #[error("event store error: {0}")]
    Store(#[from] StoreError),

    /// Delivering a push notification failed.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Encoding or writing a clip failed.
    #[error("clip writer error: {0}")]
    Clip(#[from] ClipError),
}

/// Frame source errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// A single frame read failed; the caller may retry.
    #[error("transient read failure: {0}")]
    TransientRead(String),

    /// The source failed after exhausting its retry budget and cannot
    /// continue (e.g. camera disconnected).
    #[error("fatal source error: {0}")]
    Fatal(String),
}

/// Detector errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DetectorError {
    /// The underlying model invocation failed for this frame.
    #[error("model invocation failed: {0}")]
    Inference(String),
}

/// Persistent event store errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached or the write failed.
    #[error("store write failed: {0}")]
    WriteFailed(String),
}

/// Notification transport errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotifyError {
    /// The transport was unreachable or rejected the message.
    #[error("push delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Clip writer errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClipError {
    /// No frames were available in the requested interval.
    #[error("clip range is empty")]
    EmptyRange,

    /// The encoder failed to produce a file.
    #[error("encoder error: {0}")]
    Encoder(String),
}
