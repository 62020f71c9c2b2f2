pub mod dataset_config;
pub mod llm_config;
pub mod log_config;
pub mod pipeline_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub use dataset_config::{DatasetConfig, EndpointConfig};
pub use llm_config::{LlmConfig, ProviderConfig, Seq2seqConfig, Seq2seqModelConfig};
pub use log_config::LogConfig;
pub use pipeline_config::PipelineConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Nl2GraphConfig {
    pub log: LogConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub datasets: std::collections::BTreeMap<String, DatasetConfig>,
    pub llm: LlmConfig,
    pub seq2seq: Seq2seqConfig,
}

impl Nl2GraphConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    pub fn dataset(&self, name: &str) -> Result<&DatasetConfig, ConfigError> {
        self.datasets
            .get(name)
            .ok_or_else(|| ConfigError::MissingDataset(name.to_string()))
    }
}
