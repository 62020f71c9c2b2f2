//! Narrow interfaces to the external capabilities the pipeline consumes.
//!
//! Implementations must be safe to call from several worker threads at once.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::CollaboratorError;
use crate::types::results::Metrics;
use crate::types::schema::Schema;

/// One result row from a graph database, columns in projection order.
pub type Row = Map<String, Value>;

/// What a generator returns for one question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub content: String,
    /// Token counts, latency and similar. Stored as-is.
    pub stats: Option<Map<String, Value>>,
}

/// Produces a candidate query for a natural-language question.
pub trait Generator: Send + Sync {
    fn generate(
        &self,
        question: &str,
        schema: Option<&Schema>,
    ) -> Result<GenerationOutput, CollaboratorError>;
}

/// Runs a query against a graph database.
pub trait Executor: Send + Sync {
    fn execute(&self, query: &str) -> Result<Vec<Row>, CollaboratorError>;
}

/// Compares predicted answers against gold answers.
pub trait Scorer: Send + Sync {
    fn score(&self, gold: &[Value], predicted: &[Value]) -> Metrics;
}

// ─── Arc blanket impls ──────────────────────────────────────────────

impl<T: Generator + ?Sized> Generator for Arc<T> {
    fn generate(
        &self,
        question: &str,
        schema: Option<&Schema>,
    ) -> Result<GenerationOutput, CollaboratorError> {
        (**self).generate(question, schema)
    }
}

impl<T: Executor + ?Sized> Executor for Arc<T> {
    fn execute(&self, query: &str) -> Result<Vec<Row>, CollaboratorError> {
        (**self).execute(query)
    }
}

impl<T: Scorer + ?Sized> Scorer for Arc<T> {
    fn score(&self, gold: &[Value], predicted: &[Value]) -> Metrics {
        (**self).score(gold, predicted)
    }
}
