pub mod error;
pub mod ids;
pub mod types;
pub mod value;

pub use error::{Result, SpanError};
pub use ids::{EventId, EventNumber, RunId, RunNumber, SubRunId, SubRunNumber};
pub use types::BranchType;
pub use value::ProductValue;
