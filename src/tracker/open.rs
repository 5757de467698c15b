use super::state::TrackerState;
use super::{RangeHandler, TrackerKind};
use crate::core::{EventId, RunNumber};
use crate::ranges::RangeSet;
use tracing::warn;

/// Records exactly what was seen since the last file boundary and is
/// always at the logical end: nothing is ever pending.
#[derive(Debug, Clone)]
pub struct OpenTracker {
    ranges: RangeSet,
    state: TrackerState,
}

impl OpenTracker {
    pub fn new(run: RunNumber) -> Self {
        Self {
            ranges: RangeSet::empty(run),
            state: TrackerState::Growing,
        }
    }
}

impl RangeHandler for OpenTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Open
    }

    fn state(&self) -> TrackerState {
        self.state
    }

    fn advance(&mut self, id: EventId, last_in_subrun: bool) {
        if self.ranges.run() != Some(id.run()) {
            warn!(tracker = "open", event = %id, "event belongs to another run; ignored");
            return;
        }
        self.ranges.update(id);
        self.state = TrackerState::after_event(last_in_subrun);
    }

    fn flush(&mut self) {
        self.state = TrackerState::AtBoundary;
    }

    fn maybe_split(&mut self) {}

    fn rebase(&mut self) {
        if let Some(run) = self.ranges.run() {
            self.ranges = RangeSet::empty(run);
        }
        self.state = TrackerState::Rebased;
    }

    fn seen_ranges(&self) -> RangeSet {
        self.ranges.clone()
    }
}
