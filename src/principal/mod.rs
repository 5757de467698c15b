// ============================================================================
// Principals and the principal cache
// ============================================================================
//
// A principal is the product container for one Run, SubRun or Event. Run
// and SubRun records may arrive in several fragments (one per input file
// that touched them); the cache folds fragments with the same id into a
// single shared record.
//
// ============================================================================

pub mod cache;
pub mod event;
pub mod product;
pub mod record;

pub use cache::{PrincipalCache, SharedPrincipal};
pub use event::EventPrincipal;
pub use product::{ProductDescription, ProductEntry, ProductTable};
pub use record::{Principal, PrincipalKey, RunPrincipal, SubRunPrincipal};
