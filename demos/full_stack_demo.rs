//! Full-stack fallwatch demo.
//!
//! This example demonstrates the complete flow from a synthetic frame
//! source through detection, debouncing, and the default observers.
//! Run with: `cargo run --example full_stack_demo`
//!
//! ## Architecture Demonstrated
//!
//! ```text
//! [SimulatedCamera] -> [Orchestrator] -> [BBoxRule] -> [DebounceStateMachine]
//!                                                        |-> [EventLogger]
//!                                                        |-> [PushNotifier]
//!                                                        |-> [ClipScheduler]
//!                                                        `-> [SkeletonCollector]
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, Level};

use fallwatch_buffer::RollingBuffer;
use fallwatch_collector::{CollectorConfig, PoseExtractor, SkeletonCollector};
use fallwatch_core::error::{DetectorError, Result as CoreResult, SourceError};
use fallwatch_core::{
    BBox, ClipWriter, Detector, EventId, EventStore, FallEvent, Frame, FramePixels, FrameSource,
    NotificationTransport, Skeleton, Subject,
};
use fallwatch_orchestrator::{ClipScheduler, EventLogger, Orchestrator, PushNotifier, TimerRegistry};
use fallwatch_rules::BBoxRule;
use fallwatch_statemachine::{DebounceConfig, DebounceStateMachine};

// ============================================================================
// Synthetic camera (simulates a `FrameSource` backed by a real capture card)
// ============================================================================

/// Yields blank frames at a fixed nominal frame rate, reporting an
/// upright bounding box for most of the run and a collapsed one for a
/// short window in the middle - just enough to trip the rule engine.
struct SimulatedCamera {
    fps: f64,
    frame_index: u64,
    total_frames: u64,
}

impl SimulatedCamera {
    fn new(fps: f64, duration_sec: f64) -> Self {
        Self {
            fps,
            frame_index: 0,
            total_frames: (fps * duration_sec) as u64,
        }
    }
}

#[async_trait]
impl FrameSource for SimulatedCamera {
    async fn next_frame(&mut self) -> Result<Option<(f64, FramePixels)>, SourceError> {
        if self.frame_index >= self.total_frames {
            return Ok(None);
        }
        let t = self.frame_index as f64 / self.fps;
        self.frame_index += 1;
        tokio::time::sleep(Duration::from_micros(200)).await;
        Ok(Some((t, FramePixels::new(4, 4, vec![0u8; 48]))))
    }
}

/// Reports the bounding box scripted for each frame's timestamp. A real
/// detector would run inference here; this stands in for one, tracking
/// elapsed time the same way the frame source does so both stay in sync.
struct ScriptedDetector {
    fps: f64,
    frame_index: u64,
}

impl ScriptedDetector {
    fn new(fps: f64) -> Self {
        Self { fps, frame_index: 0 }
    }

    fn bbox_for(&self, t: f64) -> BBox {
        if (4.0..=6.0).contains(&t) {
            BBox::new(100, 400, 220, 90, 0.92) // collapsed: aspect < 1.3
        } else {
            BBox::new(100, 100, 180, 420, 0.95) // upright
        }
    }
}

#[async_trait]
impl Detector for ScriptedDetector {
    async fn detect(&mut self, _pixels: &FramePixels) -> Result<Subject, DetectorError> {
        let t = self.frame_index as f64 / self.fps;
        self.frame_index += 1;
        Ok(Subject::BBox(self.bbox_for(t)))
    }
}

/// Stub pose extractor for the skeleton collector's background path.
struct StubPoseExtractor;

#[async_trait]
impl PoseExtractor for StubPoseExtractor {
    async fn extract(
        &self,
        _pixels: &FramePixels,
    ) -> Result<Option<Skeleton>, fallwatch_collector::CollectorError> {
        use fallwatch_core::Keypoint;
        Ok(Some(Skeleton::new([Keypoint::new(2.0, 2.0, 0.8); 17])))
    }
}

// ============================================================================
// Logging stand-ins for the external collaborators
// ============================================================================

struct LoggingEventStore {
    inserts: AtomicU64,
}

#[async_trait]
impl EventStore for LoggingEventStore {
    async fn insert(&self, event: &FallEvent) -> CoreResult<()> {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        info!(id = %event.event_id, t = event.confirmed_at, "event store: insert");
        Ok(())
    }

    async fn update_notified(&self, event: &FallEvent) -> CoreResult<()> {
        info!(id = %event.event_id, count = event.notification_count, "event store: update_notified");
        Ok(())
    }

    async fn mark_recovered(&self, event_id: &EventId, recovered_at: f64) -> CoreResult<()> {
        info!(id = %event_id, recovered_at, "event store: mark_recovered");
        Ok(())
    }

    async fn set_clip_path(&self, event_id: &EventId, clip_path: &std::path::Path) -> CoreResult<()> {
        info!(id = %event_id, path = %clip_path.display(), "event store: set_clip_path");
        Ok(())
    }
}

struct LoggingNotifier;

#[async_trait]
impl NotificationTransport for LoggingNotifier {
    async fn push(&self, event: &FallEvent) -> CoreResult<()> {
        info!(id = %event.event_id, "push: a fall was confirmed");
        Ok(())
    }
}

struct LoggingClipWriter;

#[async_trait]
impl ClipWriter for LoggingClipWriter {
    async fn write_clip(&self, event_id: &EventId, frames: Vec<Frame>) -> CoreResult<std::path::PathBuf> {
        let path = std::path::PathBuf::from(format!("/tmp/{event_id}.clip"));
        info!(id = %event_id, frame_count = frames.len(), path = %path.display(), "clip writer: write_clip");
        Ok(path)
    }
}

// ============================================================================
// Main Demo
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    println!("==================================================================");
    println!(" fallwatch full stack demo");
    println!("==================================================================");
    println!(" Demonstrates: source -> rule engine -> debounce -> observers");
    println!();

    let fps = 15.0;
    let buffer = Arc::new(RollingBuffer::new(20.0, fps).unwrap());

    let store = Arc::new(LoggingEventStore {
        inserts: AtomicU64::new(0),
    });
    let notifier = Arc::new(LoggingNotifier);
    let clip_writer = Arc::new(LoggingClipWriter);
    let timers = Arc::new(TimerRegistry::new(tokio::runtime::Handle::current()));

    let mut state_machine = DebounceStateMachine::new(DebounceConfig {
        delay_sec: 1.0,
        ..DebounceConfig::default()
    });

    state_machine.add_fall_observer(Box::new(EventLogger::new(
        Arc::clone(&store) as Arc<dyn EventStore>,
        tokio::runtime::Handle::current(),
    )));
    state_machine.add_fall_observer(Box::new(PushNotifier::new(
        Arc::clone(&notifier) as Arc<dyn NotificationTransport>,
        tokio::runtime::Handle::current(),
    )));
    state_machine.add_fall_observer(Box::new(ClipScheduler::new(
        Arc::clone(&buffer),
        Arc::clone(&clip_writer) as Arc<dyn ClipWriter>,
        Some(Arc::clone(&store) as Arc<dyn EventStore>),
        Arc::clone(&timers),
        2.0,
        1.0,
    )));

    let collector_dir = std::env::temp_dir().join("fallwatch-demo-skeletons");
    let collector = Arc::new(std::sync::Mutex::new(SkeletonCollector::new(
        CollectorConfig {
            enabled: true,
            output_dir: collector_dir.clone(),
            ..CollectorConfig::default()
        },
        Arc::clone(&buffer),
        Arc::new(StubPoseExtractor) as Arc<dyn PoseExtractor>,
        tokio::runtime::Handle::current(),
    )));
    state_machine.add_suspected_observer(Box::new(SkeletonCollectorHandle(Arc::clone(&collector))));

    let source = SimulatedCamera::new(fps, 10.0);
    let detector = ScriptedDetector::new(fps);
    let rule = BBoxRule::default();

    let mut orchestrator = Orchestrator::new(source, detector, rule, Arc::clone(&buffer), state_machine);

    info!("starting detection loop...");
    orchestrator.run().await?;

    collector.lock().unwrap_or_else(|e| e.into_inner()).shutdown().await;
    timers.cancel_all();

    println!();
    println!("==================================================================");
    println!(" Results");
    println!("==================================================================");
    println!(" frames buffered:        {:>6}", buffer.len());
    println!(" confirmed events logged: {:>6}", store.inserts.load(Ordering::Relaxed));
    println!(" final state:            {:?}", orchestrator.state());
    println!(" skeleton sequences in:  {}", collector_dir.display());
    println!("==================================================================");

    Ok(())
}

/// Shares the collector between the state machine's observer slot and
/// this function's own `shutdown` call at the end of the run.
struct SkeletonCollectorHandle(Arc<std::sync::Mutex<SkeletonCollector>>);

impl fallwatch_statemachine::SuspectedObserver for SkeletonCollectorHandle {
    fn on_fall_suspected(&mut self, event: &fallwatch_core::SuspectedEvent) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).on_fall_suspected(event);
    }
    fn on_suspicion_cleared(&mut self, event: &fallwatch_core::SuspectedEvent) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).on_suspicion_cleared(event);
    }
    fn on_fall_confirmed_update(&mut self, event: &fallwatch_core::SuspectedEvent) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).on_fall_confirmed_update(event);
    }
}
