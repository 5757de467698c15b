use super::state::{EventInfo, TrackerState, advance_cursor, validate_inherited};
use super::{RangeHandler, TrackerKind};
use crate::core::{EventId, Result};
use crate::ranges::RangeSet;
use tracing::{debug, trace, warn};

/// Tracks progress through a range set inherited from an upstream stage.
///
/// The inherited ranges are the universe: events are only ever attributed
/// to an output by moving the cursor over them, and a file switch in the
/// middle of a range cuts it so both files receive disjoint halves.
#[derive(Debug, Clone)]
pub struct ClosedTracker {
    ranges: RangeSet,
    idx: usize,
    last: Option<EventInfo>,
    state: TrackerState,
}

impl ClosedTracker {
    pub fn new(inherited: RangeSet) -> Result<Self> {
        validate_inherited("ClosedTracker", &inherited)?;
        Ok(Self {
            ranges: inherited,
            idx: 0,
            last: None,
            state: TrackerState::Growing,
        })
    }

    /// Ranges not yet handed to a previous file.
    pub fn remaining(&self) -> &RangeSet {
        &self.ranges
    }

    pub fn cursor(&self) -> usize {
        self.idx
    }
}

impl RangeHandler for ClosedTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Closed
    }

    fn state(&self) -> TrackerState {
        self.state
    }

    fn advance(&mut self, id: EventId, last_in_subrun: bool) {
        if !self.ranges.contains(id) {
            warn!(
                tracker = "closed",
                event = %id,
                "event lies outside the remaining inherited ranges; not attributed"
            );
        }
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
        if info.last_in_subrun {
            return;
        }
        let Some(range) = self.ranges.ranges().get(self.idx).copied() else {
            return;
        };
        if !range.contains(info.id.subrun(), info.id.event()) {
            return;
        }

        let next = info.id.next().event();
        if range.end() == next {
            trace!(tracker = "closed", event = %info.id, "split at existing boundary");
            self.idx += 1;
        } else if let Some(after) = self.ranges.split_range(info.id.subrun(), next) {
            debug!(tracker = "closed", event = %info.id, "split inherited range");
            self.idx = after;
        }
    }

    fn rebase(&mut self) {
        if self.idx >= self.ranges.len() {
            debug!(
                tracker = "closed",
                "inherited ranges exhausted; following file starts empty"
            );
        }
        self.ranges = self.ranges.extract(self.idx..self.ranges.len());
        self.idx = 0;
        self.last = None;
        self.state = TrackerState::Rebased;
    }

    fn seen_ranges(&self) -> RangeSet {
        self.ranges.extract(0..self.idx)
    }
}
