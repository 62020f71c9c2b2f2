//! Per-stage result documents and the stored result row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::key::{Method, ResultKey};

/// Output of the Generate stage. `stats` carries token counts and latency
/// and is opaque to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub query_raw: Option<String>,
    pub query: Option<String>,
    pub stats: Option<Map<String, Value>>,
}

/// Output of the Execute stage. A failed query is a normal, measured outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub result: Option<Vec<Value>>,
    pub success: bool,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn succeeded(result: Vec<Value>) -> Self {
        Self {
            result: Some(result),
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            result: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Output of the Evaluate stage. All-null means "not evaluable", which is
/// what a failed execution scores as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub exact_match: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
}

impl EvaluationResult {
    pub fn is_null(&self) -> bool {
        self.exact_match.is_none()
            && self.precision.is_none()
            && self.recall.is_none()
            && self.f1.is_none()
    }
}

/// Scores produced by a scorer. Always defined, unlike `EvaluationResult`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub exact_match: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl From<Metrics> for EvaluationResult {
    fn from(m: Metrics) -> Self {
        Self {
            exact_match: Some(m.exact_match),
            precision: Some(m.precision),
            recall: Some(m.recall),
            f1: Some(m.f1),
        }
    }
}

/// How far a result row has advanced through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StageState {
    NotStarted,
    Generated,
    Executed,
    Evaluated,
}

/// The stored value for one `ResultKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub record_id: String,
    pub method: Method,
    pub lang: String,
    pub model: String,
    pub gen: Option<GenerationResult>,
    pub exec: Option<ExecutionResult>,
    pub eval: Option<EvaluationResult>,
}

impl ResultRow {
    /// A row with no stage set. Equivalent to an absent row.
    pub fn empty(key: &ResultKey) -> Self {
        Self {
            record_id: key.record_id.clone(),
            method: key.method,
            lang: key.lang.clone(),
            model: key.model.clone(),
            gen: None,
            exec: None,
            eval: None,
        }
    }

    pub fn key(&self) -> ResultKey {
        ResultKey::new(self.record_id.clone(), self.method, self.lang.clone(), self.model.clone())
    }

    pub fn state(&self) -> StageState {
        if self.eval.is_some() {
            StageState::Evaluated
        } else if self.exec.is_some() {
            StageState::Executed
        } else if self.gen.is_some() {
            StageState::Generated
        } else {
            StageState::NotStarted
        }
    }
}
