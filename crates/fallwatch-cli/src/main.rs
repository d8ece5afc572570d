// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! `fallwatch`, the runnable binary that wires the detection pipeline
//! together end to end.
//!
//! This binary exists to prove the library crates compose correctly and
//! to give operators something runnable; all real logic lives in the
//! library crates (`fallwatch-core`, `fallwatch-buffer`,
//! `fallwatch-smoother`, `fallwatch-rules`, `fallwatch-statemachine`,
//! `fallwatch-collector`, `fallwatch-orchestrator`) so that an embedding
//! eldercare monitoring daemon can depend on them directly instead of
//! this binary.

mod demo;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use fallwatch_buffer::RollingBuffer;
use fallwatch_collector::{CollectorConfig, PoseExtractor, SkeletonCollector};
use fallwatch_core::{
    AnalysisConfig, ClipWriter, DetectionConfig, EventId, EventStore, FallEvent, Frame, FramePixels,
    LifecycleConfig, NotificationTransport, RecordingConfig, Skeleton,
};
use fallwatch_orchestrator::{ClipScheduler, EventLogger, Orchestrator, PushNotifier, TimerRegistry};
use fallwatch_rules::{BBoxRule, PoseRule, RuleEngine};
use fallwatch_smoother::SmootherConfig;
use fallwatch_statemachine::{DebounceConfig, DebounceStateMachine};

#[derive(Parser)]
#[command(name = "fallwatch")]
#[command(author = "Fallwatch Contributors")]
#[command(version)]
#[command(about = "Real-time fall-detection core for home eldercare monitoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detection loop against the built-in demo source/detector.
    Run {
        /// How long the demo source runs, in seconds.
        #[arg(long, default_value_t = 10.0)]
        duration_sec: f64,

        /// Nominal demo frame rate.
        #[arg(long, default_value_t = 15.0)]
        fps: f64,

        /// Second into the run the demo fall begins.
        #[arg(long, default_value_t = 4.0)]
        fall_at_sec: f64,

        /// Directory skeleton sequence files are written to, if enabled.
        #[arg(long)]
        skeleton_dir: Option<std::path::PathBuf>,
    },

    /// Print the configuration that would be used (env-derived, with
    /// `Default`s for anything unset), without running anything.
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).with_target(false).init();

    match cli.command {
        Commands::Run {
            duration_sec,
            fps,
            fall_at_sec,
            skeleton_dir,
        } => run(duration_sec, fps, fall_at_sec, skeleton_dir).await,
        Commands::ShowConfig => {
            show_config();
            Ok(())
        }
    }
}

fn show_config() {
    let analysis = AnalysisConfig::from_env();
    let recording = RecordingConfig::from_env();
    let detection = DetectionConfig::from_env();
    let lifecycle = LifecycleConfig::from_env();

    println!("analysis:  {analysis:#?}");
    println!("recording: {recording:#?}");
    println!("detection: {detection:#?}");
    println!("lifecycle: {lifecycle:#?}");
}

async fn run(duration_sec: f64, fps: f64, fall_at_sec: f64, skeleton_dir: Option<std::path::PathBuf>) -> Result<()> {
    let analysis = AnalysisConfig::from_env();
    let recording = RecordingConfig::from_env();
    let detection = DetectionConfig::from_env();
    let mut lifecycle = LifecycleConfig::from_env();
    if let Some(dir) = skeleton_dir {
        lifecycle.auto_skeleton_extract = true;
        lifecycle.skeleton_output_dir = dir;
    }

    info!(duration_sec, fps, fall_at_sec, "starting fallwatch demo run");

    let buffer = Arc::new(RollingBuffer::new(recording.buffer_seconds, recording.fps_nominal)?);
    let timers = Arc::new(TimerRegistry::new(tokio::runtime::Handle::current()));

    let store = Arc::new(LoggingEventStore);
    let notifier = Arc::new(LoggingNotifier);
    let clip_writer = Arc::new(LoggingClipWriter);

    let mut state_machine = DebounceStateMachine::new(DebounceConfig::from(analysis));

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
        recording.clip_before_sec,
        recording.clip_after_sec,
    )));

    let collector = Arc::new(std::sync::Mutex::new(SkeletonCollector::new(
        CollectorConfig {
            enabled: lifecycle.auto_skeleton_extract,
            before_sec: recording.clip_before_sec,
            after_sec: recording.clip_after_sec,
            output_dir: lifecycle.skeleton_output_dir.clone(),
            max_concurrent_extractions: lifecycle.extraction_workers,
            fps_nominal: recording.fps_nominal,
            ..CollectorConfig::default()
        },
        Arc::clone(&buffer),
        Arc::new(DemoPoseExtractor) as Arc<dyn PoseExtractor>,
        tokio::runtime::Handle::current(),
    )));
    state_machine.add_suspected_observer(Box::new(CollectorHandle(Arc::clone(&collector))));

    let source = demo::DemoSource::new(fps, duration_sec);
    let detector = demo::DemoDetector::new(fps, (fall_at_sec, fall_at_sec + 2.0));
    let rule = build_rule(&detection);

    let mut orchestrator = Orchestrator::new(source, detector, rule, Arc::clone(&buffer), state_machine);
    orchestrator.run().await?;

    collector.lock().unwrap_or_else(std::sync::PoisonError::into_inner).shutdown().await;
    timers.cancel_all();

    info!(final_state = ?orchestrator.state(), frames_buffered = buffer.len(), "run complete");
    Ok(())
}

/// Either rule variant the binary can select at startup, unified behind
/// one concrete type so `Orchestrator` doesn't need to be generic over
/// a trait object for this one call site.
enum SelectedRule {
    Bbox(BBoxRule),
    Pose(PoseRule),
}

impl RuleEngine for SelectedRule {
    fn is_fallen(&mut self, subject: &fallwatch_core::Subject, t: f64) -> bool {
        match self {
            Self::Bbox(rule) => rule.is_fallen(subject, t),
            Self::Pose(rule) => rule.is_fallen(subject, t),
        }
    }
}

fn build_rule(detection: &DetectionConfig) -> SelectedRule {
    if detection.use_pose {
        if detection.enable_smoothing {
            SelectedRule::Pose(PoseRule::with_smoothing(
                60.0,
                detection.min_visibility,
                SmootherConfig {
                    min_cutoff: detection.smoothing_min_cutoff,
                    beta: detection.smoothing_beta,
                    ..SmootherConfig::default()
                },
            ))
        } else {
            SelectedRule::Pose(PoseRule::new(60.0, detection.min_visibility))
        }
    } else {
        SelectedRule::Bbox(BBoxRule::default())
    }
}

struct LoggingEventStore;

#[async_trait::async_trait]
impl EventStore for LoggingEventStore {
    async fn insert(&self, event: &FallEvent) -> fallwatch_core::Result<()> {
        info!(id = %event.event_id, t = event.confirmed_at, "event store: insert");
        Ok(())
    }
    async fn update_notified(&self, event: &FallEvent) -> fallwatch_core::Result<()> {
        info!(id = %event.event_id, count = event.notification_count, "event store: update_notified");
        Ok(())
    }
    async fn mark_recovered(&self, event_id: &EventId, recovered_at: f64) -> fallwatch_core::Result<()> {
        info!(id = %event_id, recovered_at, "event store: mark_recovered");
        Ok(())
    }
    async fn set_clip_path(&self, event_id: &EventId, clip_path: &std::path::Path) -> fallwatch_core::Result<()> {
        info!(id = %event_id, path = %clip_path.display(), "event store: set_clip_path");
        Ok(())
    }
}

struct LoggingNotifier;

#[async_trait::async_trait]
impl NotificationTransport for LoggingNotifier {
    async fn push(&self, event: &FallEvent) -> fallwatch_core::Result<()> {
        info!(id = %event.event_id, "push: a fall was confirmed");
        Ok(())
    }
}

struct LoggingClipWriter;

#[async_trait::async_trait]
impl ClipWriter for LoggingClipWriter {
    async fn write_clip(&self, event_id: &EventId, frames: Vec<Frame>) -> fallwatch_core::Result<std::path::PathBuf> {
        let path = std::path::PathBuf::from(format!("/tmp/{event_id}.clip"));
        info!(id = %event_id, frame_count = frames.len(), path = %path.display(), "clip writer: write_clip");
        Ok(path)
    }
}

struct DemoPoseExtractor;

#[async_trait::async_trait]
impl PoseExtractor for DemoPoseExtractor {
    async fn extract(
        &self,
        _pixels: &FramePixels,
    ) -> Result<Option<Skeleton>, fallwatch_collector::CollectorError> {
        use fallwatch_core::Keypoint;
        Ok(Some(Skeleton::new([Keypoint::new(1.0, 1.0, 0.8); 17])))
    }
}

struct CollectorHandle(Arc<std::sync::Mutex<SkeletonCollector>>);

impl fallwatch_statemachine::SuspectedObserver for CollectorHandle {
    fn on_fall_suspected(&mut self, event: &fallwatch_core::SuspectedEvent) {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .on_fall_suspected(event);
    }
    fn on_suspicion_cleared(&mut self, event: &fallwatch_core::SuspectedEvent) {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .on_suspicion_cleared(event);
    }
    fn on_fall_confirmed_update(&mut self, event: &fallwatch_core::SuspectedEvent) {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .on_fall_confirmed_update(event);
    }
}
