// ============================================================================
// eventspan Library
// ============================================================================
//
// Range provenance and aggregation for batch event processing: which events
// each Run/SubRun product was built from, how partial products from
// several files combine without double counting, and which provenance each
// output file carries.
//
// ============================================================================

pub mod aggregate;
pub mod config;
pub mod core;
pub mod prelude;
pub mod principal;
pub mod provenance;
pub mod ranges;
pub mod stream;
pub mod tracker;

// Re-export main types for convenience
pub use crate::core::{
    BranchType, EventId, EventNumber, ProductValue, Result, RunId, RunNumber, SpanError, SubRunId,
    SubRunNumber,
};
pub use crate::ranges::{EventRange, RangeSet};

pub use aggregate::{Aggregate, Aggregator, Reading};
pub use config::OutputConfig;
pub use principal::{
    EventPrincipal, PrincipalCache, ProductDescription, ProductEntry, ProductTable, RunPrincipal,
    SubRunPrincipal,
};
pub use provenance::{
    DropMetaData, FileProvenance, InMemoryParentageRegistry, Parentage, ParentageId,
    ParentageRegistry, ProductDependencyGraph, ProductId, ProductProvenance, ProductStatus,
    ProvenanceLedger,
};
pub use stream::{FileFragment, OutputStream, SeekGate, SeekGuard};
pub use tracker::{RangeHandler, RangeTracker, TrackerKind, TrackerPolicy, TrackerState};
