// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! The per-frame pump that binds source, detector, rule engine, buffer,
//! and state machine together (spec §4.6).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fallwatch_buffer::RollingBuffer;
use fallwatch_core::error::SourceError;
use fallwatch_core::{Detector, Frame, FrameSource, FramePixels, Subject};
use fallwatch_rules::RuleEngine;
use fallwatch_statemachine::{DebounceStateMachine, MachineState};
use tracing::{error, warn};

/// Drives the detection loop: read -> detect -> rule -> buffer-push ->
/// state-update, exactly as spec §4.6's pseudocode.
///
/// Deliberately synchronous-by-construction over the external async
/// traits (spec §5): intended to run on a single dedicated thread,
/// `.await`ing each external call in turn rather than being scheduled
/// alongside other work on a multi-thread executor, so that frame-rate
/// timing is never at the mercy of an unrelated task's scheduling.
pub struct Orchestrator<S, D, R> {
    source: S,
    detector: D,
    rule_engine: R,
    buffer: Arc<RollingBuffer>,
    state_machine: DebounceStateMachine,
    stop: Arc<AtomicBool>,
}

impl<S, D, R> Orchestrator<S, D, R>
where
    S: FrameSource,
    D: Detector,
    R: RuleEngine,
{
    /// Creates a new orchestrator. `state_machine` should already have
    /// its observers registered (e.g. a [`crate::ClipScheduler`], an
    /// [`crate::EventLogger`], a [`crate::PushNotifier`], a
    /// skeleton collector) before the first [`Self::run`] call.
    #[must_use]
    pub fn new(
        source: S,
        detector: D,
        rule_engine: R,
        buffer: Arc<RollingBuffer>,
        state_machine: DebounceStateMachine,
    ) -> Self {
        Self {
            source,
            detector,
            rule_engine,
            buffer,
            state_machine,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle that can be used to request shutdown from
    /// another thread: the loop finishes processing its current frame,
    /// then exits (spec §5).
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// The state machine's current state.
    #[must_use]
    pub fn state(&self) -> MachineState {
        self.state_machine.state()
    }

    /// Runs the detection loop until the source is exhausted, a fatal
    /// source error occurs, or shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns the [`SourceError::Fatal`] that ended the loop, if any.
    pub async fn run(&mut self) -> Result<(), SourceError> {
        loop {
            if self.stop.load(Ordering::Acquire) {
                break;
            }

            match self.source.next_frame().await {
                Ok(None) => break,
                Ok(Some((t, pixels))) => self.process_frame(t, pixels).await,
                Err(SourceError::TransientRead(msg)) => {
                    warn!(error = %msg, "transient frame read failure, continuing");
                }
                Err(err @ SourceError::Fatal(_)) => {
                    error!(error = %err, "fatal source error, stopping detection loop");
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    async fn process_frame(&mut self, t: f64, pixels: FramePixels) {
        let subject = match self.detector.detect(&pixels).await {
            Ok(subject) => subject,
            Err(e) => {
                warn!(error = %e, "detector error, treating frame as no subject");
                Subject::None
            }
        };

        let fallen = self.rule_engine.is_fallen(&subject, t);
        self.buffer.push(Frame::new(t, pixels));
        self.state_machine.update(fallen, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fallwatch_core::error::DetectorError;
    use fallwatch_core::BBox;
    use fallwatch_rules::BBoxRule;
    use fallwatch_statemachine::DebounceConfig;
    use std::sync::atomic::AtomicUsize;

    struct ScriptedSource {
        frames: std::vec::IntoIter<(f64, FramePixels)>,
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        async fn next_frame(&mut self) -> Result<Option<(f64, FramePixels)>, SourceError> {
            Ok(self.frames.next())
        }
    }

    struct FixedBBoxDetector {
        bbox: BBox,
    }

    #[async_trait]
    impl Detector for FixedBBoxDetector {
        async fn detect(&mut self, _pixels: &FramePixels) -> Result<Subject, DetectorError> {
            Ok(Subject::BBox(self.bbox))
        }
    }

    fn pixels() -> FramePixels {
        FramePixels::new(2, 2, vec![0u8; 12])
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_processes_all_frames_and_stops_at_end_of_stream() {
        let frames = (0..5).map(|i| (f64::from(i) / 15.0, pixels())).collect::<Vec<_>>();
        let source = ScriptedSource {
            frames: frames.into_iter(),
        };
        let detector = FixedBBoxDetector {
            bbox: BBox::new(0, 0, 100, 130, 0.9), // not fallen
        };
        let rule = BBoxRule::default();
        let buffer = Arc::new(RollingBuffer::new(15.0, 15.0).unwrap());
        let state_machine = DebounceStateMachine::new(DebounceConfig::default());

        let mut orchestrator = Orchestrator::new(source, detector, rule, Arc::clone(&buffer), state_machine);
        orchestrator.run().await.unwrap();

        assert_eq!(buffer.len(), 5);
        assert_eq!(orchestrator.state(), MachineState::Normal);
    }

    struct FailingDetector {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Detector for FailingDetector {
        async fn detect(&mut self, _pixels: &FramePixels) -> Result<Subject, DetectorError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(DetectorError::Inference("model exploded".into()))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn detector_error_degrades_to_no_subject_and_continues() {
        let frames = vec![(0.0, pixels()), (1.0 / 15.0, pixels())];
        let source = ScriptedSource {
            frames: frames.into_iter(),
        };
        let detector = FailingDetector {
            calls: AtomicUsize::new(0),
        };
        let rule = BBoxRule::default();
        let buffer = Arc::new(RollingBuffer::new(15.0, 15.0).unwrap());
        let state_machine = DebounceStateMachine::new(DebounceConfig::default());

        let mut orchestrator = Orchestrator::new(source, detector, rule, Arc::clone(&buffer), state_machine);
        orchestrator.run().await.unwrap();

        assert_eq!(buffer.len(), 2);
        assert_eq!(orchestrator.state(), MachineState::Normal);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_handle_halts_the_loop_early() {
        // An effectively-infinite source; the loop must stop once asked.
        struct InfiniteSource {
            t: f64,
        }
        #[async_trait]
        impl FrameSource for InfiniteSource {
            async fn next_frame(&mut self) -> Result<Option<(f64, FramePixels)>, SourceError> {
                self.t += 1.0 / 15.0;
                Ok(Some((self.t, pixels())))
            }
        }

        let source = InfiniteSource { t: 0.0 };
        let detector = FixedBBoxDetector {
            bbox: BBox::new(0, 0, 100, 130, 0.9),
        };
        let rule = BBoxRule::default();
        let buffer = Arc::new(RollingBuffer::new(15.0, 15.0).unwrap());
        let state_machine = DebounceStateMachine::new(DebounceConfig::default());

        let mut orchestrator = Orchestrator::new(source, detector, rule, buffer, state_machine);
        let stop = orchestrator.stop_handle();
        stop.store(true, Ordering::SeqCst);
        orchestrator.run().await.unwrap();
    }
}
