// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! # fallwatch-collector
//!
//! The suspected-event observer that turns a resolved suspicion into a
//! labeled skeleton sequence file on disk (spec §4.5).
//!
//! Protocol, exactly as specified:
//! 1. `on_fall_suspected` records the event in a pending map. No
//!    extraction happens yet.
//! 2. `on_suspicion_cleared` / `on_fall_confirmed_update` immediately (on
//!    the calling thread) snapshot the clip from the rolling buffer,
//!    which must happen before returning since later frames may be
//!    evicted, then hand `(event, frames)` to a bounded background
//!    worker pool and remove the pending entry.
//! 3. The background worker runs the pose extractor over each frame and
//!    serializes the labeled sequence to
//!    `{suspected_id}_{confirmed|cleared}.json`.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

mod config;
mod error;
mod sequence;

pub use config::{CollectorConfig, ExtractorIdentity};
pub use error::CollectorError;
pub use sequence::SkeletonSequence;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use fallwatch_buffer::RollingBuffer;
use fallwatch_core::{Frame, FramePixels, Skeleton, SuspectedEvent, SuspectedId};
use fallwatch_statemachine::SuspectedObserver;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Runs pose detection for the collector's background extraction step.
///
/// Deliberately `&self` (not `&mut self`, unlike [`fallwatch_core::Detector`]
/// used on the hot path) so an `Arc<dyn PoseExtractor>` can be shared
/// across concurrently-running extraction tasks; a model that needs
/// interior mutability wraps it itself.
#[async_trait]
pub trait PoseExtractor: Send + Sync {
    /// Runs pose detection on a single frame, returning `None` if no
    /// subject was found in that frame.
    async fn extract(&self, pixels: &FramePixels) -> Result<Option<Skeleton>, CollectorError>;
}

/// Extracts and persists labeled skeleton sequences on suspicion
/// resolution.
pub struct SkeletonCollector {
    config: CollectorConfig,
    buffer: Arc<RollingBuffer>,
    extractor: Arc<dyn PoseExtractor>,
    runtime: tokio::runtime::Handle,
    semaphore: Arc<Semaphore>,
    pending: HashMap<SuspectedId, SuspectedEvent>,
    inflight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl SkeletonCollector {
    /// Creates a new collector. `runtime` is the handle background
    /// extractions are spawned onto (owned by the embedding
    /// application's `main`, per spec §5).
    #[must_use]
    pub fn new(
        config: CollectorConfig,
        buffer: Arc<RollingBuffer>,
        extractor: Arc<dyn PoseExtractor>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let permits = config.max_concurrent_extractions.max(1);
        Self {
            config,
            buffer,
            extractor,
            runtime,
            semaphore: Arc::new(Semaphore::new(permits)),
            pending: HashMap::new(),
            inflight: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of suspected events currently pending resolution.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn resolve(&mut self, event: &SuspectedEvent, label: &'static str) {
        self.pending.remove(&event.suspected_id);

        if !self.config.enabled {
            return;
        }

        // Snapshot synchronously, before returning to the state machine:
        // the buffer is a sliding window and later frames may already be
        // gone by the time a background worker would otherwise acquire
        // it (spec §4.5 rationale).
        let frames = self
            .buffer
            .get_clip(event.suspected_at, self.config.before_sec, self.config.after_sec);

        if frames.is_empty() {
            warn!(id = %event.suspected_id, "clip snapshot empty, skipping extraction");
            return;
        }

        let job = ExtractionJob {
            event: event.clone(),
            label,
            frames,
            output_dir: self.config.output_dir.clone(),
            fps: self.config.fps_nominal,
            source_label: self.config.source_label.clone(),
            extractor_identity: self.config.extractor.clone(),
        };

        let extractor = Arc::clone(&self.extractor);
        let semaphore = Arc::clone(&self.semaphore);

        let handle = self.runtime.spawn(async move {
            let permit = match semaphore.acquire_owned().await {
                Ok(p) => p,
                Err(_) => return, // semaphore closed at shutdown
            };
            if let Err(e) = job.run(extractor.as_ref()).await {
                error!(id = %job_id_for_log(&job), error = %e, "skeleton extraction failed");
            }
            drop(permit);
        });

        self.inflight.lock().unwrap_or_else(|e| e.into_inner()).push(handle);
    }

    /// Waits for all in-flight and queued extractions to complete.
    /// Pending (not-yet-resolved) suspicions are left untouched; only
    /// already-submitted background work is drained.
    pub async fn shutdown(&mut self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!("extraction worker panicked during shutdown drain");
                }
            }
        }
    }
}

impl SuspectedObserver for SkeletonCollector {
    fn on_fall_suspected(&mut self, event: &SuspectedEvent) {
        if !self.config.enabled {
            return;
        }
        debug!(id = %event.suspected_id, "suspected event pending");
        self.pending.insert(event.suspected_id.clone(), event.clone());
    }

    fn on_suspicion_cleared(&mut self, event: &SuspectedEvent) {
        self.resolve(event, "cleared");
    }

    fn on_fall_confirmed_update(&mut self, event: &SuspectedEvent) {
        self.resolve(event, "confirmed");
    }
}

fn job_id_for_log(job: &ExtractionJob) -> String {
    format!("{}_{}", job.event.suspected_id, job.label)
}

struct ExtractionJob {
    event: SuspectedEvent,
    label: &'static str,
    frames: Vec<Frame>,
    output_dir: PathBuf,
    fps: f64,
    source_label: String,
    extractor_identity: ExtractorIdentity,
}

impl ExtractionJob {
    async fn run(&self, extractor: &dyn PoseExtractor) -> Result<(), CollectorError> {
        if self.frames.is_empty() {
            return Err(CollectorError::EmptyClip(self.event.suspected_id.to_string()));
        }

        let mut skeletons = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            let skeleton = extractor
                .extract(&frame.pixels)
                .await
                .map_err(|e| CollectorError::Detection(e.to_string()))?;
            if let Some(skeleton) = skeleton {
                skeletons.push((
                    frame.timestamp,
                    skeleton,
                    frame.pixels.width,
                    frame.pixels.height,
                ));
            }
        }

        let sequence = SkeletonSequence::build(
            self.event.suspected_id.as_str(),
            Utc::now(),
            &self.source_label,
            self.fps,
            &self.extractor_identity,
            &skeletons,
        );

        let json = sequence.to_json()?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(format!("{}_{}.json", self.event.suspected_id, self.label));
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "wrote skeleton sequence");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallwatch_core::{FramePixels, Keypoint};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubExtractor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PoseExtractor for StubExtractor {
        async fn extract(&self, _pixels: &FramePixels) -> Result<Option<Skeleton>, CollectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Skeleton::new([Keypoint::new(10.0, 10.0, 0.9); 17])))
        }
    }

    fn frame(t: f64) -> Frame {
        Frame::new(t, FramePixels::new(4, 4, vec![0u8; 48]))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pending_then_resolved_snapshot_then_offload() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = Arc::new(RollingBuffer::new(30.0, 15.0).unwrap());
        for i in 0..10 {
            buffer.push(frame(f64::from(i)));
        }

        let extractor: Arc<dyn PoseExtractor> = Arc::new(StubExtractor {
            calls: AtomicUsize::new(0),
        });
        let config = CollectorConfig {
            enabled: true,
            before_sec: 3.0,
            after_sec: 3.0,
            output_dir: dir.path().to_path_buf(),
            ..CollectorConfig::default()
        };
        let mut collector =
            SkeletonCollector::new(config, Arc::clone(&buffer), extractor, tokio::runtime::Handle::current());

        let ev = SuspectedEvent::new(SuspectedId::new(5.0, 1), 5.0);
        collector.on_fall_suspected(&ev);
        assert_eq!(collector.pending_count(), 1);

        collector.on_fall_confirmed_update(&ev);
        assert_eq!(collector.pending_count(), 0, "resolved event leaves the pending map");

        collector.shutdown().await;

        let path = dir.path().join(format!("{}_confirmed.json", ev.suspected_id));
        assert!(path.exists(), "expected sequence file at {path:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn disabled_collector_does_not_extract() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = Arc::new(RollingBuffer::new(30.0, 15.0).unwrap());
        buffer.push(frame(0.0));
        let extractor: Arc<dyn PoseExtractor> = Arc::new(StubExtractor {
            calls: AtomicUsize::new(0),
        });
        let config = CollectorConfig {
            enabled: false,
            output_dir: dir.path().to_path_buf(),
            ..CollectorConfig::default()
        };
        let mut collector =
            SkeletonCollector::new(config, buffer, extractor, tokio::runtime::Handle::current());
        let ev = SuspectedEvent::new(SuspectedId::new(0.0, 1), 0.0);
        collector.on_fall_suspected(&ev);
        collector.on_suspicion_cleared(&ev);
        collector.shutdown().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_clip_is_skipped_not_errored() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = Arc::new(RollingBuffer::new(30.0, 15.0).unwrap());
        // No frames pushed: any get_clip is empty.
        let extractor: Arc<dyn PoseExtractor> = Arc::new(StubExtractor {
            calls: AtomicUsize::new(0),
        });
        let config = CollectorConfig {
            enabled: true,
            output_dir: dir.path().to_path_buf(),
            ..CollectorConfig::default()
        };
        let mut collector =
            SkeletonCollector::new(config, buffer, extractor, tokio::runtime::Handle::current());
        let ev = SuspectedEvent::new(SuspectedId::new(0.0, 1), 0.0);
        collector.on_fall_suspected(&ev);
        collector.on_suspicion_cleared(&ev);
        collector.shutdown().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
