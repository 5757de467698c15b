use super::state::{EventInfo, TrackerState, advance_cursor, validate_inherited};
use super::{RangeHandler, TrackerKind};
use crate::core::{EventId, Result};
use crate::ranges::RangeSet;
use tracing::debug;

/// Inherited-range tracker for sources that only switch output files on
/// Run/SubRun boundaries. It never cuts a range: one straddling a switch
/// stays pending and is attributed whole to the following file.
#[derive(Debug, Clone)]
pub struct BoundedTracker {
    ranges: RangeSet,
    idx: usize,
    last: Option<EventInfo>,
    state: TrackerState,
}

impl BoundedTracker {
    pub fn new(inherited: RangeSet) -> Result<Self> {
        validate_inherited("BoundedTracker", &inherited)?;
        Ok(Self::from_tail(inherited, TrackerState::Growing))
    }

    fn from_tail(ranges: RangeSet, state: TrackerState) -> Self {
        Self {
            ranges,
            idx: 0,
            last: None,
            state,
        }
    }
}

impl RangeHandler for BoundedTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Bounded
    }

    fn state(&self) -> TrackerState {
        self.state
    }

    fn advance(&mut self, id: EventId, last_in_subrun: bool) {
        let info = EventInfo { id, last_in_subrun };
        self.idx = advance_cursor(&self.ranges, self.idx, info);
        self.last = Some(info);
        self.state = TrackerState::after_event(last_in_subrun);
    }

    fn flush(&mut self) {
        self.idx = self.ranges.len();
        self.state = TrackerState::AtBoundary;
    }

    fn maybe_split(&mut self) {
        let Some(info) = self.last else {
            return;
        };
        let straddles = !info.last_in_subrun
            && self
                .ranges
                .ranges()
                .get(self.idx)
                .is_some_and(|r| r.contains(info.id.subrun(), info.id.event()));
        if straddles {
            debug!(
                tracker = "bounded",
                event = %info.id,
                "range straddles the file switch; deferred to the next file"
            );
        }
    }

    fn rebase(&mut self) {
        let tail = self.ranges.extract(self.idx..self.ranges.len());
        *self = Self::from_tail(tail, TrackerState::Rebased);
    }

    fn seen_ranges(&self) -> RangeSet {
        self.ranges.extract(0..self.idx)
    }
}
