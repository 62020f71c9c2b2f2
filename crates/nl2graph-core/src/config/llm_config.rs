//! Generator backends: chat-completion providers and seq2seq inference servers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_SEQ2SEQ_TIMEOUT_SECS};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Directory holding `<lang>.j2` prompt templates. Built-in template when unset.
    pub templates: Option<PathBuf>,
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl LlmConfig {
    /// First provider whose prefix list matches the model name.
    pub fn provider_for(&self, model: &str) -> Option<(&str, &ProviderConfig)> {
        self.providers.iter().find_map(|(name, provider)| {
            provider
                .model_prefixes
                .iter()
                .any(|prefix| model.starts_with(prefix.as_str()))
                .then_some((name.as_str(), provider))
        })
    }
}

/// An OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key_env: Option<String>,
    pub model_prefixes: Vec<String>,
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Seq2seqConfig {
    pub models: BTreeMap<String, Seq2seqModelConfig>,
}

/// A fine-tuned model served behind an HTTP inference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Seq2seqModelConfig {
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
}

impl Seq2seqModelConfig {
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_SEQ2SEQ_TIMEOUT_SECS)
    }
}
