use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity a product is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BranchType {
    Event,
    SubRun,
    Run,
}

impl BranchType {
    /// Run and SubRun products carry a range of validity; Event products don't.
    pub fn supports_ranges(&self) -> bool {
        matches!(self, Self::SubRun | Self::Run)
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchType::Event => write!(f, "InEvent"),
            BranchType::SubRun => write!(f, "InSubRun"),
            BranchType::Run => write!(f, "InRun"),
        }
    }
}
