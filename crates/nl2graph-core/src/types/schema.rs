//! Graph schema handed to generators as prompt context.

use std::path::Path;

use crate::errors::ConfigError;

/// A graph schema rendered as text for a specific query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub lang: String,
    pub text: String,
}

impl Schema {
    pub fn new(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            text: text.into(),
        }
    }

    /// Read a schema file as-is.
    pub fn load(lang: &str, path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(lang, text))
    }

    pub fn to_prompt_string(&self) -> &str {
        self.text.trim()
    }
}
