use crate::core::{EventNumber, SubRunNumber};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open span `[begin, end)` of event numbers inside one subrun.
///
/// Ordered by `(subrun, begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventRange {
    subrun: SubRunNumber,
    begin: EventNumber,
    end: EventNumber,
}

impl EventRange {
    pub fn new(subrun: SubRunNumber, begin: EventNumber, end: EventNumber) -> Self {
        Self { subrun, begin, end }
    }

    /// Range covering every event of `subrun`.
    pub fn full_subrun(subrun: SubRunNumber) -> Self {
        Self::new(subrun, 0, EventNumber::MAX)
    }

    pub fn is_full_subrun(&self) -> bool {
        self.begin == 0 && self.end == EventNumber::MAX
    }

    pub fn subrun(&self) -> SubRunNumber {
        self.subrun
    }

    pub fn begin(&self) -> EventNumber {
        self.begin
    }

    pub fn end(&self) -> EventNumber {
        self.end
    }

    pub(crate) fn set_end(&mut self, end: EventNumber) {
        self.end = end;
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.begin <= self.end
    }

    pub fn contains(&self, subrun: SubRunNumber, event: EventNumber) -> bool {
        self.subrun == subrun && self.begin <= event && event < self.end
    }

    /// `other` starts exactly where `self` ends.
    pub fn is_adjacent(&self, other: &EventRange) -> bool {
        self.subrun == other.subrun && self.end == other.begin
    }

    pub fn overlaps(&self, other: &EventRange) -> bool {
        self.subrun == other.subrun
            && !self.is_empty()
            && !other.is_empty()
            && self.begin < other.end
            && other.begin < self.end
    }

    pub fn is_disjoint(&self, other: &EventRange) -> bool {
        !self.overlaps(other)
    }

    /// Extends `self` to cover `other` when the two touch or overlap.
    /// Returns false, leaving `self` untouched, otherwise.
    pub fn merge(&mut self, other: &EventRange) -> bool {
        if self.subrun != other.subrun || other.begin > self.end || self.begin > other.end {
            return false;
        }
        self.begin = self.begin.min(other.begin);
        self.end = self.end.max(other.end);
        true
    }
}

impl fmt::Display for EventRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SubRun: {} Event range: [{},{})",
            self.subrun, self.begin, self.end
        )
    }
}
