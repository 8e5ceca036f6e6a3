//! The pipeline coordinator: one long-lived producer thread that pulls
//! frames, drives the stage chain, and publishes results without ever
//! blocking on the consumer.
//!
//! Frame acquisition is the only blocking call per iteration; the
//! cooperative stop flag is checked once per iteration, so a stop request
//! takes effect at the next frame boundary. On exit the coordinator
//! force-closes the open state segment into the sink and releases the
//! frame source.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use log::{info, warn};
use thiserror::Error;

use gaze_calib::GazeMapper;
use gaze_core::{
    extract_features, AreaOfInterest, EmaFilter, GazePoint, GazeSample, GazeState, Real,
    SessionMarker, StateEvent, StateMachine,
};

use crate::config::{ConfigError, PipelineConfig};
use crate::result::PipelineResult;
use crate::sink::SessionSink;
use crate::source::{FrameSource, LandmarkDetector};
use crate::summary::{summarize_session, SessionSummary};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Surfaced at spawn; a session must never run on an unfitted model.
    #[error("cannot start session: gaze mapper is not calibrated")]
    NotCalibrated,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn pipeline worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("pipeline worker thread panicked")]
    WorkerPanicked,
}

/// Everything the worker hands back when the session ends.
pub struct SessionOutcome<S> {
    /// The sink, returned to the caller with all records applied.
    pub sink: S,
    pub summary: SessionSummary,
    /// Committed transition events, including the final closing segment.
    pub events: Vec<StateEvent>,
    /// Results discarded because the consumer channel was full.
    pub dropped_results: u64,
}

struct WorkerOutput<S> {
    sink: S,
    summary: SessionSummary,
    events: Vec<StateEvent>,
}

/// Consumer-side handle to a running session.
pub struct PipelineHandle<S: SessionSink> {
    results: Receiver<PipelineResult>,
    markers: Sender<String>,
    stop: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    worker: thread::JoinHandle<WorkerOutput<S>>,
}

impl<S: SessionSink> PipelineHandle<S> {
    /// Non-blocking read of the next result, typically polled on a UI
    /// timer. `None` when nothing is pending.
    pub fn try_recv(&self) -> Option<PipelineResult> {
        self.results.try_recv().ok()
    }

    /// Results dropped so far because the consumer lagged.
    pub fn dropped_results(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Queue an operator marker; it is stamped and recorded at the next
    /// processed frame.
    pub fn add_marker(&self, label: impl Into<String>) {
        let _ = self.markers.send(label.into());
    }

    /// Whether the worker has ended on its own (source exhausted).
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Request a cooperative stop, wait for the worker, and collect the
    /// session outcome. The final open state segment is force-closed
    /// before the worker exits.
    pub fn stop(self) -> Result<SessionOutcome<S>, PipelineError> {
        self.stop.store(true, Ordering::Relaxed);
        let out = self
            .worker
            .join()
            .map_err(|_| PipelineError::WorkerPanicked)?;
        Ok(SessionOutcome {
            sink: out.sink,
            summary: out.summary,
            events: out.events,
            dropped_results: self.dropped.load(Ordering::Relaxed),
        })
    }
}

/// Owns the session-scoped pipeline state and the external resources for
/// the duration of one session. Construction validates everything that
/// has no safe default; after [`spawn`](Self::spawn) the only way back is
/// [`PipelineHandle::stop`].
pub struct PipelineCoordinator<Src, Det, S> {
    source: Src,
    detector: Det,
    mapper: GazeMapper,
    aoi: AreaOfInterest,
    sink: S,
    config: PipelineConfig,
}

impl<Src, Det, S> PipelineCoordinator<Src, Det, S>
where
    Src: FrameSource + Send + 'static,
    Src::Frame: Send,
    Det: LandmarkDetector<Src::Frame> + Send + 'static,
    S: SessionSink + Send + 'static,
{
    /// Validate inputs and start the worker thread.
    ///
    /// A degenerate area of interest is not fatal: it is logged and every
    /// frame classifies out-of-area, which keeps a live session running
    /// on malformed configuration.
    pub fn spawn(
        source: Src,
        detector: Det,
        mapper: GazeMapper,
        aoi: AreaOfInterest,
        sink: S,
        config: PipelineConfig,
    ) -> Result<PipelineHandle<S>, PipelineError> {
        config.validate()?;
        if !mapper.is_fitted() {
            return Err(PipelineError::NotCalibrated);
        }
        if aoi.is_degenerate() {
            warn!(
                "area of interest has {} vertices; every frame will classify out-of-area",
                aoi.vertices().len()
            );
        }

        let (result_tx, result_rx) = bounded(config.channel_capacity);
        let (marker_tx, marker_rx) = unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicU64::new(0));

        let coordinator = Self {
            source,
            detector,
            mapper,
            aoi,
            sink,
            config,
        };
        let worker_stop = stop.clone();
        let worker_dropped = dropped.clone();
        let worker = thread::Builder::new()
            .name("gaze-pipeline".into())
            .spawn(move || coordinator.run(result_tx, marker_rx, worker_stop, worker_dropped))?;

        Ok(PipelineHandle {
            results: result_rx,
            markers: marker_tx,
            stop,
            dropped,
            worker,
        })
    }

    fn run(
        mut self,
        result_tx: Sender<PipelineResult>,
        marker_rx: Receiver<String>,
        stop: Arc<AtomicBool>,
        dropped: Arc<AtomicU64>,
    ) -> WorkerOutput<S> {
        let mut ema = EmaFilter::new(self.config.ema_alpha);
        let mut machine = StateMachine::new(self.config.stable_ms);
        let mut samples: Vec<GazeSample> = Vec::new();

        let mut session_start: Option<Real> = None;
        let mut last_mono = 0.0;
        let mut last_ts_ms: u64 = 0;
        let mut face_lost_since: Option<Real> = None;
        let mut auto_paused = false;

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            // The sole blocking point of an iteration.
            let Some((frame, stamp)) = self.source.acquire() else {
                break;
            };
            let mono = stamp.t_mono_s;
            let wall = stamp.t_wall_s;
            if session_start.is_none() {
                session_start = Some(mono);
                ema.reset();
                machine.reset(mono);
            }
            last_mono = mono;

            while let Ok(label) = marker_rx.try_recv() {
                self.sink.record_marker(&SessionMarker {
                    t_mono_s: mono,
                    t_wall_s: wall,
                    label,
                });
            }

            // Video landmark models require strictly increasing stamps.
            let ts_ms = ((mono * 1000.0).max(0.0) as u64).max(last_ts_ms + 1);
            last_ts_ms = ts_ms;
            let observation = self.detector.detect(&frame, ts_ms);

            let mut gaze = GazePoint::center();
            let mut confidence = 0.0;
            let mut raw_state = GazeState::Unknown;
            let mut face_detected = false;
            let mut left_iris = None;
            let mut right_iris = None;

            match observation {
                Some(obs) if obs.confidence >= self.config.min_confidence => {
                    face_lost_since = None;
                    if auto_paused {
                        auto_paused = false;
                        info!("auto-pause released");
                    }

                    // A numerically bad frame degrades to UNKNOWN; it must
                    // never interrupt the loop.
                    let predicted = extract_features(&obs)
                        .ok()
                        .and_then(|features| self.mapper.predict(&features).ok());
                    match predicted {
                        Some(raw_gaze) => {
                            gaze = ema.update(raw_gaze);
                            confidence = obs.confidence;
                            face_detected = true;
                            raw_state = if self.aoi.contains(gaze) {
                                GazeState::InArea
                            } else {
                                GazeState::OutOfArea
                            };
                            left_iris = Some(obs.left_eye.iris);
                            right_iris = Some(obs.right_eye.iris);
                        }
                        None => {
                            warn!("dropping frame with unusable landmarks at {:.3}s", mono);
                        }
                    }
                }
                _ => {
                    let since = *face_lost_since.get_or_insert(mono);
                    if !auto_paused && mono - since >= self.config.auto_pause_s {
                        auto_paused = true;
                        info!("auto-pause engaged after {:.1}s without a face", mono - since);
                    }
                }
            }

            let seen_events = machine.events().len();
            let committed = machine.update(raw_state, mono);
            for i in seen_events..machine.events().len() {
                self.sink.record_event(&machine.events()[i]);
            }

            let sample = GazeSample {
                t_mono_s: mono,
                t_wall_s: wall,
                gaze,
                confidence,
                state: committed,
            };
            self.sink.record_sample(&sample);
            samples.push(sample);

            let result = PipelineResult {
                sample,
                raw_state,
                face_detected,
                auto_paused,
                left_iris,
                right_iris,
            };
            match result_tx.try_send(result) {
                Ok(()) => {}
                // Consumer is slower than the pipeline; newest result is lost.
                Err(TrySendError::Full(_)) => {
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
                // Consumer went away entirely; end the session.
                Err(TrySendError::Disconnected(_)) => break,
            }
        }

        let (summary, events) = match session_start {
            Some(start) => {
                if let Some(ev) = machine.force_close(last_mono) {
                    self.sink.record_event(&ev);
                }
                let duration = last_mono - start;
                info!(
                    "session ended: {:.1}s, {} samples, {} transitions",
                    duration,
                    samples.len(),
                    machine.events().len()
                );
                (
                    summarize_session(&samples, machine.events(), duration),
                    machine.events().to_vec(),
                )
            }
            None => (summarize_session(&[], &[], 0.0), Vec::new()),
        };

        WorkerOutput {
            sink: self.sink,
            summary,
            events,
        }
    }
}
