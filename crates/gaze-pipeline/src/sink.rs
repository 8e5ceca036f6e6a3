//! Session sink: receives samples, committed transition events and
//! markers in emission order. Durable persistence lives behind this seam;
//! implementations must not block the coordinator beyond a bounded
//! enqueue.

use gaze_core::{GazeSample, SessionMarker, StateEvent};

pub trait SessionSink {
    fn record_sample(&mut self, sample: &GazeSample);
    fn record_event(&mut self, event: &StateEvent);
    fn record_marker(&mut self, marker: &SessionMarker);
}

/// Collects all records in memory. Used by tests and by consumers that
/// compute statistics after the session instead of streaming to disk.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    samples: Vec<GazeSample>,
    events: Vec<StateEvent>,
    markers: Vec<SessionMarker>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[GazeSample] {
        &self.samples
    }

    pub fn events(&self) -> &[StateEvent] {
        &self.events
    }

    pub fn markers(&self) -> &[SessionMarker] {
        &self.markers
    }
}

impl SessionSink for MemorySink {
    fn record_sample(&mut self, sample: &GazeSample) {
        self.samples.push(*sample);
    }

    fn record_event(&mut self, event: &StateEvent) {
        self.events.push(*event);
    }

    fn record_marker(&mut self, marker: &SessionMarker) {
        self.markers.push(marker.clone());
    }
}
