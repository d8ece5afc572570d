// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! Error type for `fallwatch-collector`.

use thiserror::Error;

/// Errors that can occur during a single background extraction (spec §7:
/// "extraction worker failure... logged and skipped; it does not retry
/// and does not affect other events").
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectorError {
    /// The snapshot taken from the rolling buffer was empty.
    #[error("clip snapshot was empty for suspected event {0}")]
    EmptyClip(String),

    /// The pose detector failed on one or more frames.
    #[error("pose detection failed: {0}")]
    Detection(String),

    /// Writing the skeleton sequence file failed.
    #[error("failed to write skeleton sequence file: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the skeleton sequence failed.
    #[error("failed to serialize skeleton sequence: {0}")]
    Serialize(#[from] serde_json::Error),
}
