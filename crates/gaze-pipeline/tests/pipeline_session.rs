//! End-to-end sessions over scripted observation streams.

use std::thread;
use std::time::Duration;

use anyhow::Result;

use gaze_calib::{calibration_grid, CalibrationSample, GazeMapper};
use gaze_core::synthetic::synthetic_observation;
use gaze_core::{extract_features, AreaOfInterest, FaceObservation, GazePoint, GazeState, Pt2, Real};
use gaze_pipeline::{
    FrameSource, FrameStamp, MemorySink, PipelineConfig, PipelineCoordinator, PipelineError,
    RecordedFrame, ReplayDetector, ReplaySource,
};

const FPS: Real = 30.0;

fn fitted_mapper() -> GazeMapper {
    let samples: Vec<CalibrationSample> = calibration_grid()
        .into_iter()
        .map(|target| CalibrationSample {
            features: extract_features(&synthetic_observation(target)).unwrap(),
            target,
            observation_count: 1,
        })
        .collect();
    let mut mapper = GazeMapper::new(2, 1.0);
    mapper.fit(&samples).unwrap();
    mapper
}

fn square_aoi(lo: Real, hi: Real) -> AreaOfInterest {
    AreaOfInterest::new(vec![
        Pt2::new(lo, lo),
        Pt2::new(hi, lo),
        Pt2::new(hi, hi),
        Pt2::new(lo, hi),
    ])
}

/// Frames at 30 fps; each entry is (frame count, gazed-at point or no face).
fn script(segments: &[(usize, Option<GazePoint>)]) -> Vec<RecordedFrame> {
    let mut frames = Vec::new();
    let mut idx = 0usize;
    for &(count, target) in segments {
        for _ in 0..count {
            let t = idx as Real / FPS;
            frames.push(RecordedFrame {
                t_mono_s: t,
                t_wall_s: 1_700_000_000.0 + t,
                observation: target.map(synthetic_observation),
            });
            idx += 1;
        }
    }
    frames
}

#[test]
fn single_frame_spike_never_commits() -> Result<()> {
    // True (unfiltered) state is out-of-area for exactly one frame in the
    // middle of a 5 second in-area stream. Smoothing is disabled so the
    // spike really reaches the state machine.
    let mut config = PipelineConfig::default();
    config.ema_alpha = 1.0;

    let center = GazePoint::new(0.5, 0.5);
    let spike = GazePoint::new(0.98, 0.5);
    let frames = script(&[(75, Some(center)), (1, Some(spike)), (74, Some(center))]);

    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        config,
    )?;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    let outcome = handle.stop()?;

    // The spike must appear neither as a committed transition nor as a
    // closed out-of-area segment.
    for ev in &outcome.events {
        assert_ne!(ev.to_state, GazeState::OutOfArea, "spike committed: {ev:?}");
        assert_ne!(ev.from_state, GazeState::OutOfArea, "spike segment: {ev:?}");
    }
    // Once in-area commits it stays committed for the whole stream.
    for sample in outcome.sink.samples() {
        assert_ne!(sample.state, GazeState::OutOfArea);
    }
    let last = outcome.sink.samples().last().unwrap();
    assert_eq!(last.state, GazeState::InArea);
    Ok(())
}

#[test]
fn sustained_glance_commits_and_is_summarized() -> Result<()> {
    let center = GazePoint::new(0.5, 0.5);
    let away = GazePoint::new(0.98, 0.5);
    // 2 s in, 1 s out, 2 s in.
    let frames = script(&[(60, Some(center)), (30, Some(away)), (60, Some(center))]);

    let mut config = PipelineConfig::default();
    config.ema_alpha = 1.0;
    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        config,
    )?;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    let outcome = handle.stop()?;

    assert_eq!(outcome.summary.out_glances, 1);
    assert_eq!(outcome.summary.out_durations_ms.len(), 1);
    // Debounce shifts both edges by the stability window, so the segment
    // length stays near the scripted second.
    let out_ms = outcome.summary.out_durations_ms[0];
    assert!((700.0..=1300.0).contains(&out_ms), "out segment {out_ms} ms");
    assert!(outcome.summary.in_area_s > 3.0);
    Ok(())
}

#[test]
fn low_confidence_frames_classify_unknown() -> Result<()> {
    // A visible face with nearly shut lids: openness collapses, so the
    // derived confidence lands under the gate.
    let mut squint = synthetic_observation(GazePoint::new(0.5, 0.5));
    let mut left = squint.left_eye;
    let mut right = squint.right_eye;
    left.bottom_lid.y = left.top_lid.y + 1e-4;
    right.bottom_lid.y = right.top_lid.y + 1e-4;
    squint = FaceObservation::from_landmarks(left, right, squint.nose, squint.chin, squint.forehead);
    assert!(squint.confidence < 0.3);

    let frames: Vec<RecordedFrame> = (0..30)
        .map(|i| RecordedFrame {
            t_mono_s: i as Real / FPS,
            t_wall_s: i as Real / FPS,
            observation: Some(squint),
        })
        .collect();

    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        PipelineConfig::default(),
    )?;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    let outcome = handle.stop()?;

    for sample in outcome.sink.samples() {
        assert_eq!(sample.state, GazeState::Unknown);
        assert_eq!(sample.confidence, 0.0);
    }
    Ok(())
}

#[test]
fn stalled_consumer_drops_newest_results() -> Result<()> {
    let frames = script(&[(100, Some(GazePoint::new(0.5, 0.5)))]);
    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        PipelineConfig::default(),
    )?;
    // Never read until the producer is done: the channel holds the first
    // five results and everything after is defined data loss.
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }

    let mut received = 0;
    while handle.try_recv().is_some() {
        received += 1;
    }
    assert_eq!(received, 5);

    let outcome = handle.stop()?;
    assert_eq!(outcome.dropped_results, 95);
    // The sink saw every frame regardless of consumer lag.
    assert_eq!(outcome.sink.samples().len(), 100);
    Ok(())
}

/// Endless 30 fps source for cooperative-stop tests; sleeps briefly per
/// frame so the worker does not spin.
struct EndlessSource {
    idx: usize,
    gaze: GazePoint,
}

impl FrameSource for EndlessSource {
    type Frame = Option<FaceObservation>;

    fn acquire(&mut self) -> Option<(Self::Frame, FrameStamp)> {
        thread::sleep(Duration::from_millis(2));
        let t = self.idx as Real / FPS;
        self.idx += 1;
        Some((
            Some(synthetic_observation(self.gaze)),
            FrameStamp {
                t_mono_s: t,
                t_wall_s: t,
            },
        ))
    }
}

#[test]
fn stop_flushes_final_segment_and_markers() -> Result<()> {
    let handle = PipelineCoordinator::spawn(
        EndlessSource {
            idx: 0,
            gaze: GazePoint::new(0.5, 0.5),
        },
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        PipelineConfig::default(),
    )?;
    handle.add_marker("checkpoint");
    thread::sleep(Duration::from_millis(100));
    let outcome = handle.stop()?;

    assert!(!outcome.sink.samples().is_empty());
    assert_eq!(outcome.sink.markers().len(), 1);
    assert_eq!(outcome.sink.markers()[0].label, "checkpoint");

    // The last recorded event closes the open segment without changing
    // state.
    let last = outcome.sink.events().last().copied().unwrap();
    assert_eq!(last.from_state, last.to_state);
    assert!(outcome.summary.total_duration_s > 0.0);
    Ok(())
}

#[test]
fn auto_pause_engages_after_face_loss() -> Result<()> {
    let mut config = PipelineConfig::default();
    config.channel_capacity = 1000;
    let frames = script(&[
        (15, Some(GazePoint::new(0.5, 0.5))),
        (120, None), // 4 s without a face; pause threshold is 3 s
    ]);
    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        config,
    )?;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }

    let mut results = Vec::new();
    while let Some(r) = handle.try_recv() {
        results.push(r);
    }
    handle.stop()?;

    assert!(!results.first().unwrap().auto_paused);
    assert!(results.last().unwrap().auto_paused);
    // Pause engages once the loss outlasts the window, not immediately.
    let first_paused = results.iter().position(|r| r.auto_paused).unwrap();
    let lost_at = results.iter().position(|r| !r.face_detected).unwrap();
    let waited_s = results[first_paused].sample.t_mono_s - results[lost_at].sample.t_mono_s;
    assert!(waited_s >= 2.9, "paused after only {waited_s:.2}s");
    Ok(())
}

#[test]
fn unfitted_mapper_is_refused_at_spawn() {
    let err = PipelineCoordinator::spawn(
        ReplaySource::new(Vec::new()),
        ReplayDetector,
        GazeMapper::new(2, 1.0),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        PipelineConfig::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, PipelineError::NotCalibrated));
}

#[test]
fn invalid_config_is_refused_at_spawn() {
    let mut config = PipelineConfig::default();
    config.ema_alpha = 2.0;
    let err = PipelineCoordinator::spawn(
        ReplaySource::new(Vec::new()),
        ReplayDetector,
        fitted_mapper(),
        square_aoi(0.1, 0.9),
        MemorySink::new(),
        config,
    )
    .err()
    .unwrap();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn degenerate_aoi_degrades_to_out_of_area() -> Result<()> {
    let frames = script(&[(30, Some(GazePoint::new(0.5, 0.5)))]);
    let handle = PipelineCoordinator::spawn(
        ReplaySource::new(frames),
        ReplayDetector,
        fitted_mapper(),
        AreaOfInterest::default(),
        MemorySink::new(),
        PipelineConfig::default(),
    )?;
    while !handle.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    let outcome = handle.stop()?;

    // Pipeline keeps running; with no usable region every confident frame
    // classifies out-of-area and eventually commits.
    let last = outcome.sink.samples().last().unwrap();
    assert_eq!(last.state, GazeState::OutOfArea);
    Ok(())
}
