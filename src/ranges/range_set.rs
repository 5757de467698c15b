use super::EventRange;
use crate::core::{BranchType, EventId, EventNumber, Result, RunNumber, SpanError, SubRunNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Ordered set of event ranges belonging to one run.
///
/// A set without a run is *invalid*: it is the "nothing known yet" value,
/// distinct from a valid set with no ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSet {
    run: Option<RunNumber>,
    ranges: Vec<EventRange>,
}

impl RangeSet {
    pub fn invalid() -> Self {
        Self {
            run: None,
            ranges: Vec::new(),
        }
    }

    pub fn empty(run: RunNumber) -> Self {
        Self {
            run: Some(run),
            ranges: Vec::new(),
        }
    }

    /// Builds a set for `run`; the ranges are sorted but otherwise kept as
    /// given, so a malformed input stays detectable via [`is_well_formed`].
    ///
    /// [`is_well_formed`]: RangeSet::is_well_formed
    pub fn new(run: RunNumber, ranges: impl IntoIterator<Item = EventRange>) -> Self {
        let mut ranges: Vec<EventRange> = ranges.into_iter().collect();
        ranges.sort();
        Self {
            run: Some(run),
            ranges,
        }
    }

    /// Set standing for every event of one subrun.
    pub fn for_subrun(run: RunNumber, subrun: SubRunNumber) -> Self {
        Self::new(run, [EventRange::full_subrun(subrun)])
    }

    /// Valid with no ranges: a product put for the run as a whole.
    pub fn is_full_run(&self) -> bool {
        self.is_valid() && self.ranges.is_empty()
    }

    pub fn is_full_subrun(&self) -> bool {
        self.is_valid() && self.ranges.len() == 1 && self.ranges[0].is_full_subrun()
    }

    pub fn run(&self) -> Option<RunNumber> {
        self.run
    }

    pub fn ranges(&self) -> &[EventRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.iter().all(EventRange::is_empty)
    }

    pub fn is_valid(&self) -> bool {
        self.run.is_some()
    }

    /// Valid, every range well-formed, and no two ranges overlap.
    pub fn is_well_formed(&self) -> bool {
        self.is_valid()
            && self.ranges.iter().all(EventRange::is_valid)
            && self.ranges.windows(2).all(|pair| {
                pair[0].subrun() < pair[1].subrun()
                    || (pair[0].subrun() == pair[1].subrun() && pair[0].end() <= pair[1].begin())
            })
    }

    pub fn front_subrun(&self) -> Option<SubRunNumber> {
        self.ranges.first().map(EventRange::subrun)
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.run == Some(id.run()) && self.first_range_containing(id.subrun(), id.event()).is_some()
    }

    pub fn first_range_containing(&self, subrun: SubRunNumber, event: EventNumber) -> Option<usize> {
        self.ranges.iter().position(|r| r.contains(subrun, event))
    }

    pub fn emplace_range(&mut self, subrun: SubRunNumber, begin: EventNumber, end: EventNumber) {
        let range = EventRange::new(subrun, begin, end);
        let idx = self.ranges.partition_point(|r| *r <= range);
        self.ranges.insert(idx, range);
    }

    /// Records one processed event, extending the trailing range when the
    /// event directly follows it.
    pub fn update(&mut self, id: EventId) {
        if self.run.is_none() {
            self.run = Some(id.run());
        }
        if let Some(last) = self.ranges.last_mut() {
            if last.subrun() == id.subrun() {
                if last.end() == id.event() {
                    last.set_end(id.next().event());
                    return;
                }
                if last.contains(id.subrun(), id.event()) {
                    return;
                }
            }
        }
        self.emplace_range(id.subrun(), id.event(), id.next().event());
    }

    /// Cuts the range containing `event` into `[begin, event)` and
    /// `[event, end)`. Returns the index of the second half, or `None` if
    /// `event` is already a boundary or lies outside every range.
    pub fn split_range(&mut self, subrun: SubRunNumber, event: EventNumber) -> Option<usize> {
        let idx = self
            .ranges
            .iter()
            .position(|r| r.subrun() == subrun && r.begin() < event && event < r.end())?;
        let original = self.ranges[idx];
        self.ranges[idx] = EventRange::new(subrun, original.begin(), event);
        self.ranges
            .insert(idx + 1, EventRange::new(subrun, event, original.end()));
        Some(idx + 1)
    }

    /// Copy of the ranges at positions `span`, clamped to the set.
    pub fn extract(&self, span: Range<usize>) -> RangeSet {
        let end = span.end.min(self.ranges.len());
        let start = span.start.min(end);
        RangeSet {
            run: self.run,
            ranges: self.ranges[start..end].to_vec(),
        }
    }

    /// Equivalent set with touching ranges coalesced and empty ranges
    /// removed.
    pub fn collapse(&self) -> RangeSet {
        let mut sorted = self.ranges.clone();
        sorted.sort();
        RangeSet {
            run: self.run,
            ranges: coalesce(sorted),
        }
    }

    /// Set union. Merging into an invalid set adopts `other`; merging an
    /// invalid `other` is a no-op.
    pub fn merge(&mut self, other: &RangeSet) -> Result<()> {
        let Some(other_run) = other.run else {
            return Ok(());
        };
        let Some(run) = self.run else {
            *self = other.collapse();
            return Ok(());
        };
        if run != other_run {
            return Err(SpanError::logic(
                "RangeSet",
                format!("cannot merge ranges of run {} into ranges of run {}", other_run, run),
            ));
        }
        let mut all = self.ranges.clone();
        all.extend(other.ranges.iter().copied());
        all.sort();
        self.ranges = coalesce(all);
        Ok(())
    }

    /// Every event id covered by the set, in order.
    pub fn events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.run.into_iter().flat_map(move |run| {
            self.ranges.iter().flat_map(move |r| {
                (r.begin()..r.end()).map(move |event| EventId::new(run, r.subrun(), event))
            })
        })
    }
}

impl Default for RangeSet {
    fn default() -> Self {
        Self::invalid()
    }
}

fn coalesce(sorted: Vec<EventRange>) -> Vec<EventRange> {
    let mut out: Vec<EventRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if range.is_empty() {
            continue;
        }
        if let Some(last) = out.last_mut() {
            if last.merge(&range) {
                continue;
            }
        }
        out.push(range);
    }
    out
}

/// True when no event is covered by both sets. Invalid sets are never
/// disjoint from anything; sets of different runs always are.
pub fn disjoint_ranges(a: &RangeSet, b: &RangeSet) -> bool {
    let (Some(run_a), Some(run_b)) = (a.run, b.run) else {
        return false;
    };
    if run_a != run_b {
        return true;
    }

    let (mut i, mut j) = (0, 0);
    while i < a.ranges.len() && j < b.ranges.len() {
        let (x, y) = (a.ranges[i], b.ranges[j]);
        if x.overlaps(&y) {
            return false;
        }
        if (x.subrun(), x.end()) <= (y.subrun(), y.end()) {
            i += 1;
        } else {
            j += 1;
        }
    }
    true
}

/// Both valid and covering exactly the same events.
pub fn same_ranges(a: &RangeSet, b: &RangeSet) -> bool {
    a.is_valid() && b.is_valid() && a.run == b.run && a.collapse().ranges == b.collapse().ranges
}

/// Range set a Run/SubRun product read from input is written with.
///
/// When the product's first range does not start inside the ranges the
/// record has seen, part of the product was already written with another
/// record fragment and the set is invalidated. Full-run and full-subrun
/// sets are kept as they are.
pub fn maybe_invalidate(branch_type: BranchType, seen: &RangeSet, product: &RangeSet) -> RangeSet {
    let Some(run) = product.run else {
        return RangeSet::invalid();
    };
    let full = match branch_type {
        BranchType::Run => product.is_full_run(),
        BranchType::SubRun => product.is_full_subrun(),
        BranchType::Event => true,
    };
    let Some(front) = product.ranges.first().filter(|_| !full) else {
        return product.clone();
    };
    if seen.contains(EventId::new(run, front.subrun(), front.begin())) {
        product.clone()
    } else {
        RangeSet::invalid()
    }
}

/// Both valid, sharing some events, but not identical.
pub fn overlapping_ranges(a: &RangeSet, b: &RangeSet) -> bool {
    a.is_valid() && b.is_valid() && !disjoint_ranges(a, b) && !same_ranges(a, b)
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.run {
            None => write!(f, "Run: invalid"),
            Some(run) => {
                write!(f, "Run: {}", run)?;
                for range in &self.ranges {
                    write!(f, "\n {}", range)?;
                }
                Ok(())
            }
        }
    }
}
