//! End-of-session statistics computed from the recorded stream.
//!
//! Durations come from committed transition events: each event carries the
//! time spent in its `from_state`. The final open segment must be closed
//! (the coordinator's stop path calls `force_close`) before summarizing,
//! or its time is simply absent from the per-state totals.

use serde::{Deserialize, Serialize};

use gaze_core::{GazeSample, GazeState, Real, StateEvent};

/// Downsampled replay/chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Seconds since the first sample.
    pub t_s: Real,
    pub x: Real,
    pub y: Real,
    pub state: GazeState,
}

/// Flat, serializable session debrief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_duration_s: Real,
    pub in_area_s: Real,
    pub out_area_s: Real,
    pub unknown_s: Real,
    pub in_area_pct: Real,
    pub out_area_pct: Real,
    pub unknown_pct: Real,
    /// Number of committed entries into the out-of-area state.
    pub out_glances: usize,
    /// Duration of every out-of-area segment, in milliseconds.
    pub out_durations_ms: Vec<Real>,
    pub avg_out_ms: Real,
    pub median_out_ms: Real,
    pub max_out_ms: Real,
    pub total_samples: usize,
    pub avg_confidence: Real,
    pub timeline: Vec<TimelinePoint>,
}

/// Keep roughly 10 Hz of timeline at a 30 fps capture rate.
const TIMELINE_STRIDE: usize = 3;

pub fn summarize_session(
    samples: &[GazeSample],
    events: &[StateEvent],
    session_duration_s: Real,
) -> SessionSummary {
    let mut in_area_s = 0.0;
    let mut out_area_s = 0.0;
    let mut unknown_s = 0.0;
    for ev in events {
        let secs = ev.duration_ms() / 1000.0;
        match ev.from_state {
            GazeState::InArea => in_area_s += secs,
            GazeState::OutOfArea => out_area_s += secs,
            GazeState::Unknown => unknown_s += secs,
        }
    }

    let total = if session_duration_s > 0.0 {
        session_duration_s
    } else {
        1.0
    };

    let out_durations_ms: Vec<Real> = events
        .iter()
        .filter(|ev| ev.from_state == GazeState::OutOfArea)
        .map(StateEvent::duration_ms)
        .collect();
    let out_glances = events
        .iter()
        .filter(|ev| ev.to_state == GazeState::OutOfArea)
        .count();

    let avg_out_ms = if out_durations_ms.is_empty() {
        0.0
    } else {
        out_durations_ms.iter().sum::<Real>() / out_durations_ms.len() as Real
    };
    let median_out_ms = median(&out_durations_ms);
    let max_out_ms = out_durations_ms.iter().copied().fold(0.0, Real::max);

    let conf_values: Vec<Real> = samples
        .iter()
        .map(|s| s.confidence)
        .filter(|&c| c > 0.0)
        .collect();
    let avg_confidence = if conf_values.is_empty() {
        0.0
    } else {
        conf_values.iter().sum::<Real>() / conf_values.len() as Real
    };

    let timeline = match samples.first() {
        None => Vec::new(),
        Some(first) => samples
            .iter()
            .step_by(TIMELINE_STRIDE)
            .map(|s| TimelinePoint {
                t_s: s.t_mono_s - first.t_mono_s,
                x: s.gaze.x,
                y: s.gaze.y,
                state: s.state,
            })
            .collect(),
    };

    SessionSummary {
        total_duration_s: session_duration_s,
        in_area_s,
        out_area_s,
        unknown_s,
        in_area_pct: in_area_s / total * 100.0,
        out_area_pct: out_area_s / total * 100.0,
        unknown_pct: unknown_s / total * 100.0,
        out_glances,
        out_durations_ms,
        avg_out_ms,
        median_out_ms,
        max_out_ms,
        total_samples: samples.len(),
        avg_confidence,
        timeline,
    }
}

fn median(values: &[Real]) -> Real {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(Real::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::GazePoint;

    fn sample(t: Real, state: GazeState) -> GazeSample {
        GazeSample {
            t_mono_s: t,
            t_wall_s: t + 1000.0,
            gaze: GazePoint::center(),
            confidence: 0.9,
            state,
        }
    }

    fn event(from: GazeState, to: GazeState, start: Real, end: Real) -> StateEvent {
        StateEvent {
            from_state: from,
            to_state: to,
            start_mono_s: start,
            end_mono_s: end,
        }
    }

    #[test]
    fn empty_session() {
        let summary = summarize_session(&[], &[], 0.0);
        assert_eq!(summary.total_duration_s, 0.0);
        assert_eq!(summary.out_glances, 0);
        assert_eq!(summary.total_samples, 0);
        assert!(summary.timeline.is_empty());
    }

    #[test]
    fn all_in_area() {
        let events = vec![
            event(GazeState::Unknown, GazeState::InArea, 0.0, 1.0),
            // Closing segment emitted by force_close.
            event(GazeState::InArea, GazeState::InArea, 1.0, 11.0),
        ];
        let samples: Vec<GazeSample> =
            (0..11).map(|i| sample(i as Real, GazeState::InArea)).collect();
        let summary = summarize_session(&samples, &events, 11.0);

        assert!((summary.in_area_s - 10.0).abs() < 0.01);
        assert_eq!(summary.out_glances, 0);
        assert!(summary.out_durations_ms.is_empty());
        assert!((summary.avg_confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn out_glance_counted_with_duration() {
        let events = vec![
            event(GazeState::Unknown, GazeState::InArea, 0.0, 0.5),
            event(GazeState::InArea, GazeState::OutOfArea, 0.5, 5.5),
            event(GazeState::OutOfArea, GazeState::InArea, 5.5, 7.5),
            event(GazeState::InArea, GazeState::InArea, 7.5, 10.0),
        ];
        let samples: Vec<GazeSample> =
            (0..11).map(|i| sample(i as Real, GazeState::InArea)).collect();
        let summary = summarize_session(&samples, &events, 10.0);

        assert_eq!(summary.out_glances, 1);
        assert_eq!(summary.out_durations_ms.len(), 1);
        assert!((summary.out_durations_ms[0] - 2000.0).abs() < 1.0);
        assert!((summary.avg_out_ms - 2000.0).abs() < 1.0);
        assert!((summary.median_out_ms - 2000.0).abs() < 1.0);
        assert!((summary.max_out_ms - 2000.0).abs() < 1.0);
        // 5s in + 2.5s in after the glance.
        assert!((summary.in_area_s - 7.5).abs() < 0.01);
        assert!((summary.out_area_s - 2.0).abs() < 0.01);
    }

    #[test]
    fn timeline_is_downsampled_and_relative() {
        let samples: Vec<GazeSample> = (0..10)
            .map(|i| sample(100.0 + i as Real * 0.1, GazeState::InArea))
            .collect();
        let summary = summarize_session(&samples, &[], 1.0);
        assert_eq!(summary.timeline.len(), 4); // indices 0, 3, 6, 9
        assert!(summary.timeline[0].t_s.abs() < 1e-9);
        assert!((summary.timeline[1].t_s - 0.3).abs() < 1e-9);
    }

    #[test]
    fn median_of_even_count() {
        let events = vec![
            event(GazeState::OutOfArea, GazeState::InArea, 0.0, 1.0),
            event(GazeState::OutOfArea, GazeState::InArea, 2.0, 5.0),
        ];
        let summary = summarize_session(&[], &events, 10.0);
        assert!((summary.median_out_ms - 2000.0).abs() < 1e-6);
    }
}
