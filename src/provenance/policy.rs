use crate::core::{Result, SpanError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much provenance an output stream keeps.
///
/// - `DropNone`: every selected product and, transitively, every ancestor
///   produced in this process.
/// - `DropPrior`: only products produced in this process, no ancestors.
/// - `DropAll`: nothing beyond the status of missing products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DropMetaData {
    #[default]
    DropNone,
    DropPrior,
    DropAll,
}

impl FromStr for DropMetaData {
    type Err = SpanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(Self::DropNone),
            "PRIOR" => Ok(Self::DropPrior),
            "ALL" => Ok(Self::DropAll),
            _ => Err(SpanError::Configuration(format!(
                "Illegal dropMetaData parameter value: {}. Legal values are 'NONE', 'PRIOR', and 'ALL'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for DropMetaData {
    type Error = SpanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DropMetaData> for String {
    fn from(value: DropMetaData) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DropMetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropMetaData::DropNone => write!(f, "NONE"),
            DropMetaData::DropPrior => write!(f, "PRIOR"),
            DropMetaData::DropAll => write!(f, "ALL"),
        }
    }
}
