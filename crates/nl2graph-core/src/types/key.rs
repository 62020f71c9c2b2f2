//! Run configurations and the composite result key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How a candidate query is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Llm,
    Seq2seq,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Seq2seq => "seq2seq",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llm" => Ok(Self::Llm),
            "seq2seq" => Ok(Self::Seq2seq),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// The `(method, lang, model)` triple identifying one way of producing and
/// executing queries for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunConfig {
    pub method: Method,
    pub lang: String,
    pub model: String,
}

impl RunConfig {
    pub fn new(method: Method, lang: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            method,
            lang: lang.into(),
            model: model.into(),
        }
    }

    /// The result key for `record_id` under this run configuration.
    pub fn key_for(&self, record_id: &str) -> ResultKey {
        ResultKey {
            record_id: record_id.to_string(),
            method: self.method,
            lang: self.lang.clone(),
            model: self.model.clone(),
        }
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.method, self.lang, self.model)
    }
}

/// Composite primary key of the result store. No field alone is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultKey {
    pub record_id: String,
    pub method: Method,
    pub lang: String,
    pub model: String,
}

impl ResultKey {
    pub fn new(
        record_id: impl Into<String>,
        method: Method,
        lang: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            method,
            lang: lang.into(),
            model: model.into(),
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.method, self.lang.clone(), self.model.clone())
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}/{}", self.record_id, self.method, self.lang, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_and_displays() {
        assert_eq!("llm".parse::<Method>().unwrap(), Method::Llm);
        assert_eq!("seq2seq".parse::<Method>().unwrap(), Method::Seq2seq);
        assert!("t5".parse::<Method>().is_err());
        assert_eq!(Method::Seq2seq.to_string(), "seq2seq");
    }

    #[test]
    fn key_for_carries_the_run_configuration() {
        let run = RunConfig::new(Method::Llm, "cypher", "gpt-4o");
        let key = run.key_for("q1");
        assert_eq!(key.record_id, "q1");
        assert_eq!(key.run_config(), run);
        assert_eq!(key.to_string(), "q1@llm/cypher/gpt-4o");
    }
}
