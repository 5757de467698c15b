//! Common imports for code driving output streams and aggregate cells.
//!
//! `use eventspan::prelude::*;` brings in the id types, range algebra,
//! trackers (with the `RangeHandler` trait in scope), aggregate cells,
//! principals and the provenance ledger.

pub use crate::aggregate::{Aggregate, Aggregator, Reading};
pub use crate::config::OutputConfig;
pub use crate::core::{
    BranchType, EventId, ProductValue, Result, RunId, SpanError, SubRunId,
};
pub use crate::principal::{
    EventPrincipal, PrincipalCache, ProductDescription, ProductEntry, ProductTable, RunPrincipal,
    SharedPrincipal, SubRunPrincipal,
};
pub use crate::provenance::{
    DropMetaData, InMemoryParentageRegistry, Parentage, ParentageRegistry, ProductId,
    ProductProvenance, ProductStatus, ProvenanceLedger,
};
pub use crate::ranges::{EventRange, RangeSet};
pub use crate::stream::{FileFragment, OutputStream, SeekGate};
pub use crate::tracker::{RangeHandler, RangeTracker, TrackerKind, TrackerPolicy, TrackerState};
