// ============================================================================
// Provenance ledger
// ============================================================================
//
// Per output stream, the ledger records which provenance records must be
// written with each Run/SubRun/Event record, and accumulates the
// parent → children graph between product branches for the file being
// written. Historical parentage is resolved through a registry the caller
// injects.
//
// ============================================================================

pub mod graph;
pub mod ids;
pub mod ledger;
pub mod policy;
pub mod registry;

pub use graph::ProductDependencyGraph;
pub use ids::{Parentage, ParentageId, ProductId, ProductProvenance, ProductStatus};
pub use ledger::{FileProvenance, ProvenanceLedger};
pub use policy::DropMetaData;
pub use registry::{InMemoryParentageRegistry, ParentageRegistry};
