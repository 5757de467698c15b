use crate::core::{Result, SpanError};
use crate::provenance::DropMetaData;
use crate::tracker::TrackerPolicy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Output stream configuration
///
/// Field names follow the framework's parameter names when read from a
/// document (`dropMetaData`, `dropMetaDataForDroppedData`, `tracker`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct OutputConfig {
    /// How much provenance to keep
    pub drop_meta_data: DropMetaData,

    /// Skip ancestors of dropped products
    pub drop_meta_data_for_dropped_data: bool,

    /// Range tracker selection for each source
    pub tracker: TrackerPolicy,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provenance drop policy
    pub fn drop_meta_data(mut self, policy: DropMetaData) -> Self {
        self.drop_meta_data = policy;
        self
    }

    /// Set whether ancestors of dropped products are skipped
    pub fn drop_meta_data_for_dropped_data(mut self, drop: bool) -> Self {
        self.drop_meta_data_for_dropped_data = drop;
        self
    }

    /// Set the range tracker policy
    pub fn tracker(mut self, policy: TrackerPolicy) -> Self {
        self.tracker = policy;
        self
    }

    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)
            .map_err(|e| SpanError::Configuration(format!("invalid output configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(document: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(document)
            .map_err(|e| SpanError::Configuration(format!("invalid output configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.drop_meta_data == DropMetaData::DropAll && self.drop_meta_data_for_dropped_data {
            warn!("dropMetaDataForDroppedData has no effect when dropMetaData is ALL");
        }
        Ok(())
    }
}
