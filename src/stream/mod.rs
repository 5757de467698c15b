// ============================================================================
// Output stream driver
// ============================================================================
//
// Ties the pieces together for one output stream: a tracker per open Run
// and SubRun, file switches that split those trackers, and the provenance
// ledger that is closed with each file.
//
// ============================================================================

pub mod driver;
pub mod seek;

pub use driver::{FileFragment, OutputStream};
pub use seek::{SeekGate, SeekGuard};
