//! Debounce / hysteresis state machine for gaze classification.
//!
//! Raw per-frame classifications flicker; downstream statistics need a
//! stream that only changes when the new state has been observed
//! continuously for a stability window. Any disagreement inside the window
//! restarts the clock, so a committed state has always been unanimous for
//! the full window.

use log::debug;

use crate::math::Real;
use crate::types::{GazeState, StateEvent};

/// Callback invoked on every committed transition.
pub type TransitionCallback = Box<dyn FnMut(&StateEvent) + Send>;

/// Commits a state transition only after the candidate has been stable for
/// `stable_ms` milliseconds.
pub struct StateMachine {
    stable_ms: Real,

    committed: GazeState,
    /// Monotonic seconds when the committed segment began.
    segment_start: Real,

    /// Challenger state and the monotonic time it started being observed.
    pending: Option<(GazeState, Real)>,

    events: Vec<StateEvent>,
    on_transition: Option<TransitionCallback>,
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("stable_ms", &self.stable_ms)
            .field("committed", &self.committed)
            .field("pending", &self.pending)
            .field("events", &self.events.len())
            .finish()
    }
}

impl StateMachine {
    pub fn new(stable_ms: Real) -> Self {
        Self {
            stable_ms,
            committed: GazeState::Unknown,
            segment_start: 0.0,
            pending: None,
            events: Vec::new(),
            on_transition: None,
        }
    }

    /// Restore the initial state at a new session's time origin.
    pub fn reset(&mut self, mono_s: Real) {
        self.committed = GazeState::Unknown;
        self.segment_start = mono_s;
        self.pending = None;
        self.events.clear();
    }

    /// Feed a raw classification; returns the committed state.
    pub fn update(&mut self, candidate: GazeState, mono_s: Real) -> GazeState {
        if candidate == self.committed {
            // Agreement clears any half-accumulated challenger.
            self.pending = None;
            return self.committed;
        }

        match self.pending {
            Some((state, since)) if state == candidate => {
                let elapsed_ms = (mono_s - since) * 1000.0;
                if elapsed_ms >= self.stable_ms {
                    self.commit(candidate, mono_s);
                }
            }
            // A new disagreement restarts the stability clock.
            _ => self.pending = Some((candidate, mono_s)),
        }

        self.committed
    }

    /// Close the open segment at session end without changing the
    /// committed state. Returns `None` if no time has elapsed.
    pub fn force_close(&mut self, mono_s: Real) -> Option<StateEvent> {
        if mono_s <= self.segment_start {
            return None;
        }
        let event = StateEvent {
            from_state: self.committed,
            to_state: self.committed,
            start_mono_s: self.segment_start,
            end_mono_s: mono_s,
        };
        self.events.push(event);
        Some(event)
    }

    pub fn set_on_transition(&mut self, callback: TransitionCallback) {
        self.on_transition = Some(callback);
    }

    pub fn current_state(&self) -> GazeState {
        self.committed
    }

    /// All committed events so far, in emission order.
    pub fn events(&self) -> &[StateEvent] {
        &self.events
    }

    fn commit(&mut self, new_state: GazeState, mono_s: Real) {
        let event = StateEvent {
            from_state: self.committed,
            to_state: new_state,
            start_mono_s: self.segment_start,
            end_mono_s: mono_s,
        };
        self.events.push(event);
        debug!(
            "state: {} -> {} ({:.0} ms)",
            self.committed.as_str(),
            new_state.as_str(),
            event.duration_ms(),
        );
        if let Some(cb) = self.on_transition.as_mut() {
            cb(&event);
        }

        self.committed = new_state;
        self.segment_start = mono_s;
        self.pending = None;
    }
}
