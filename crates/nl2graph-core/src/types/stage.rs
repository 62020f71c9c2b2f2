//! Pipeline stages and the existence policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// One ordered processing step applied to a record under a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Gen,
    Exec,
    Eval,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Gen, Stage::Exec, Stage::Eval];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gen => "gen",
            Self::Exec => "exec",
            Self::Eval => "eval",
        }
    }

    /// Present participle used in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gen => "Generating",
            Self::Exec => "Executing",
            Self::Eval => "Evaluating",
        }
    }

    /// The stage that must have a stored value before this one may run.
    pub fn prerequisite(&self) -> Option<Stage> {
        match self {
            Self::Gen => None,
            Self::Exec => Some(Self::Gen),
            Self::Eval => Some(Self::Exec),
        }
    }

    /// This stage followed by every stage that consumes its output.
    pub fn cascade(&self) -> &'static [Stage] {
        match self {
            Self::Gen => &[Self::Gen, Self::Exec, Self::Eval],
            Self::Exec => &[Self::Exec, Self::Eval],
            Self::Eval => &[Self::Eval],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gen" => Ok(Self::Gen),
            "exec" => Ok(Self::Exec),
            "eval" => Ok(Self::Eval),
            other => Err(ConfigError::UnknownStage(other.to_string())),
        }
    }
}

/// What a stage does with records that already have a value for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Only advance records not yet past this stage.
    #[default]
    Skip,
    /// Recompute and cascade-invalidate downstream regardless of state.
    Override,
}

impl IfExists {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for IfExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IfExists {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "override" => Ok(Self::Override),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}
