//! Scripted collaborators for tests. Both are thread-safe and count calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use nl2graph_core::errors::CollaboratorError;
use nl2graph_core::traits::{Executor, GenerationOutput, Generator, Row};
use nl2graph_core::Schema;
use serde_json::Value;

/// Answers each question with `QUERY <question>` unless scripted otherwise.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<HashMap<String, Result<String, CollaboratorError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, question: &str, content: &str) -> Self {
        self.script(question, Ok(content.to_string()))
    }

    pub fn fail(self, question: &str, message: &str) -> Self {
        self.script(question, Err(CollaboratorError::Backend(message.to_string())))
    }

    fn script(self, question: &str, response: Result<String, CollaboratorError>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(question.to_string(), response);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator for ScriptedGenerator {
    fn generate(
        &self,
        question: &str,
        _schema: Option<&Schema>,
    ) -> Result<GenerationOutput, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .responses
            .lock()
            .map_err(|_| CollaboratorError::Backend("script lock poisoned".into()))?
            .get(question)
            .cloned();
        let content = match scripted {
            Some(response) => response?,
            None => format!("QUERY {question}"),
        };
        Ok(GenerationOutput {
            content,
            stats: None,
        })
    }
}

/// Returns the scripted rows for a query, or no rows.
#[derive(Default)]
pub struct MapExecutor {
    responses: Mutex<HashMap<String, Result<Vec<Row>, CollaboratorError>>>,
    calls: AtomicUsize,
}

impl MapExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-column rows, one per value, under column `x`.
    pub fn values(self, query: &str, values: Vec<Value>) -> Self {
        let rows = values
            .into_iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert("x".to_string(), v);
                row
            })
            .collect();
        self.rows(query, rows)
    }

    pub fn rows(self, query: &str, rows: Vec<Row>) -> Self {
        self.script(query, Ok(rows))
    }

    pub fn fail(self, query: &str, message: &str) -> Self {
        self.script(query, Err(CollaboratorError::Backend(message.to_string())))
    }

    fn script(self, query: &str, response: Result<Vec<Row>, CollaboratorError>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(query.to_string(), response);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Executor for MapExecutor {
    fn execute(&self, query: &str) -> Result<Vec<Row>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let responses = self
            .responses
            .lock()
            .map_err(|_| CollaboratorError::Backend("script lock poisoned".into()))?;
        responses.get(query).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}
