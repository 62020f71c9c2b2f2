//! Stage runner configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WORKERS;
use crate::types::stage::IfExists;

/// Defaults applied to every stage invocation. CLI flags override these.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker pool size. Default: 1 (sequential).
    pub workers: Option<usize>,
    /// Existing-result policy. Default: skip.
    pub if_exists: Option<IfExists>,
    /// Under skip, treat records whose execution failed as still pending
    /// evaluation. Default: false.
    pub reevaluate_failed: Option<bool>,
    /// Pull the query out of fenced code blocks in generator output.
    /// Default: false (the raw content is the query).
    pub extract_query: Option<bool>,
}

impl PipelineConfig {
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS)
    }

    pub fn effective_if_exists(&self) -> IfExists {
        self.if_exists.unwrap_or_default()
    }

    pub fn effective_reevaluate_failed(&self) -> bool {
        self.reevaluate_failed.unwrap_or(false)
    }

    pub fn effective_extract_query(&self) -> bool {
        self.extract_query.unwrap_or(false)
    }
}
