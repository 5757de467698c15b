// ============================================================================
// Aggregate cells
// ============================================================================
//
// Module-side accumulation of Run/SubRun products (totals, calibration
// constants, histograms) read back one reading at a time. Each cell keeps
// the union of the ranges folded in so far and refuses anything that
// would count an event twice.
//
// ============================================================================

pub mod aggregator;
pub mod traits;

pub use aggregator::{Aggregator, Reading, disjoint_ranges, overlapping_ranges, same_ranges};
pub use traits::Aggregate;
