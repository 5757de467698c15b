use super::state::{EventInfo, TrackerState};
use super::{RangeHandler, TrackerKind};
use crate::core::{EventId, EventNumber, RunNumber, SubRunNumber};
use crate::ranges::RangeSet;
use tracing::{debug, warn};

/// Grows ranges from the events it is advanced with. The trailing range
/// of a subrun stays pending until the subrun ends, the tracker is
/// flushed, or a file switch closes it.
#[derive(Debug, Clone)]
pub struct UnboundedTracker {
    ranges: RangeSet,
    /// Ranges before this index are closed.
    cursor: usize,
    last: Option<EventInfo>,
    /// Where the pending range was cut by the last `maybe_split`, if it
    /// was cut mid-subrun.
    split_point: Option<(SubRunNumber, EventNumber)>,
    state: TrackerState,
}

impl UnboundedTracker {
    pub fn new(run: RunNumber) -> Self {
        Self {
            ranges: RangeSet::empty(run),
            cursor: 0,
            last: None,
            split_point: None,
            state: TrackerState::Growing,
        }
    }

    fn run(&self) -> Option<RunNumber> {
        self.ranges.run()
    }

    /// Non-empty ranges past the cursor. The zero-width range seeded by a
    /// mid-subrun rebase does not count.
    fn pending_ranges(&self) -> usize {
        self.ranges.ranges()[self.cursor.min(self.ranges.len())..]
            .iter()
            .filter(|r| !r.is_empty())
            .count()
    }
}

impl RangeHandler for UnboundedTracker {
    fn kind(&self) -> TrackerKind {
        TrackerKind::Unbounded
    }

    fn state(&self) -> TrackerState {
        self.state
    }

    fn advance(&mut self, id: EventId, last_in_subrun: bool) {
        if self.run() != Some(id.run()) {
            warn!(tracker = "unbounded", event = %id, "event belongs to another run; ignored");
            return;
        }
        self.ranges.update(id);
        if last_in_subrun {
            self.cursor = self.ranges.len();
        }
        self.last = Some(EventInfo { id, last_in_subrun });
        self.state = TrackerState::after_event(last_in_subrun);
    }

    fn flush(&mut self) {
        self.cursor = self.ranges.len();
        self.state = TrackerState::AtBoundary;
    }

    fn maybe_split(&mut self) {
        if self.state == TrackerState::Rebased {
            return;
        }
        self.split_point = match self.last {
            Some(info) if !info.last_in_subrun && self.state == TrackerState::Growing => {
                Some((info.id.subrun(), info.id.next().event()))
            }
            _ => None,
        };
        self.cursor = self.ranges.len();
    }

    fn rebase(&mut self) {
        let Some(run) = self.run() else {
            return;
        };
        let pending = self.pending_ranges();
        if pending > 0 {
            warn!(
                tracker = "unbounded",
                pending,
                "rebase without maybe_split drops pending ranges"
            );
        }
        let mut fresh = RangeSet::empty(run);
        if let Some((subrun, next)) = self.split_point.take() {
            debug!(tracker = "unbounded", subrun, next, "continuing growth after split");
            fresh.emplace_range(subrun, next, next);
        }
        self.ranges = fresh;
        self.cursor = 0;
        self.last = None;
        self.state = TrackerState::Rebased;
    }

    fn seen_ranges(&self) -> RangeSet {
        self.ranges.extract(0..self.cursor).collapse()
    }
}
