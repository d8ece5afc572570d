// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! # fallwatch-core
//!
//! Shared data model, external-interface traits, and error types for the
//! fallwatch real-time fall-detection core.
//!
//! This crate provides:
//! - Frame, bounding-box, and skeleton types (the detector's output shape)
//! - `FallEvent` / `SuspectedEvent` lifecycle records
//! - Trait boundaries for the external collaborators (frame source,
//!   detector, event store, notification transport, clip writer)
//! - Configuration surface structs
//! - Aggregated error types
//!
//! ## Design Principles
//!
//! - **Zero-cost abstractions**: newtypes compile away
//! - **Cheap cloning**: frame pixel payloads are `Arc`-wrapped
//! - **Strongly typed**: the detector's output is a tagged union, not a
//!   class hierarchy

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod error;
pub mod event;
pub mod external;
pub mod frame;
pub mod subject;

pub use config::{AnalysisConfig, DetectionConfig, LifecycleConfig, RecordingConfig};
pub use error::{Error, Result};
pub use event::{EventId, FallEvent, Outcome, SuspectedEvent, SuspectedId};
pub use external::{ClipWriter, Detector, EventStore, FrameSource, NotificationTransport};
pub use frame::{Frame, FramePixels};
pub use subject::{BBox, Keypoint, Skeleton, Subject, COCO17_NAMES};
