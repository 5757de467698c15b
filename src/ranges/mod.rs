// ============================================================================
// Interval handles
// ============================================================================
//
// The range-of-validity value attached to every Run and SubRun product:
// an ordered set of half-open event ranges per subrun, all in one run.
//
// Only the algebra the trackers, aggregators and working records consume
// lives here: emplace, update, split, collapse, union and the
// disjoint/overlap/same predicates, plus the write-time invalidation of
// partially seen input products.
//
// ============================================================================

pub mod event_range;
pub mod range_set;

pub use event_range::EventRange;
pub use range_set::{RangeSet, disjoint_ranges, maybe_invalidate, overlapping_ranges, same_ranges};
