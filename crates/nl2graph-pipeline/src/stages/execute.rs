//! Execute: candidate query → answer rows. Backend failures are recorded,
//! not propagated.

use std::sync::Arc;

use nl2graph_core::constants::NO_QUERY_ERROR;
use nl2graph_core::errors::PipelineError;
use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::traits::{Executor, Row};
use nl2graph_core::{ExecutionResult, ResultKey, Stage};
use serde_json::Value;
use tracing::debug;

use super::{Outcome, StageTask};
use crate::pending::WorkItem;

/// Single-column rows become scalars; wider rows become arrays of their
/// column values in projection order.
pub fn flatten_rows(rows: Vec<Row>) -> Vec<Value> {
    rows.into_iter()
        .map(|row| {
            if row.len() == 1 {
                row.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null)
            } else {
                Value::Array(row.into_iter().map(|(_, v)| v).collect())
            }
        })
        .collect()
}

pub struct ExecuteTask {
    executor: Arc<dyn Executor>,
}

impl ExecuteTask {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn run_query(&self, item: &WorkItem) -> ExecutionResult {
        let query = item
            .row
            .as_ref()
            .and_then(|r| r.gen.as_ref())
            .and_then(|g| g.query.as_deref())
            .filter(|q| !q.trim().is_empty());
        let Some(query) = query else {
            return ExecutionResult::failed(NO_QUERY_ERROR);
        };

        match self.executor.execute(query) {
            Ok(rows) => ExecutionResult::succeeded(flatten_rows(rows)),
            Err(e) => {
                debug!(record_id = %item.record.id, error = %e, "query failed");
                ExecutionResult::failed(e.to_string())
            }
        }
    }
}

impl StageTask for ExecuteTask {
    fn stage(&self) -> Stage {
        Stage::Exec
    }

    fn process(
        &self,
        item: &WorkItem,
        key: &ResultKey,
        store: &dyn IResultStore,
    ) -> Result<Outcome, PipelineError> {
        let exec = self.run_query(item);
        store.save_execution(key, &exec)?;
        Ok(if exec.success {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn single_column_rows_flatten_to_scalars() {
        let rows = vec![row(&[("name", json!("Paris"))]), row(&[("name", json!("Lyon"))])];
        assert_eq!(flatten_rows(rows), vec![json!("Paris"), json!("Lyon")]);
    }

    #[test]
    fn wide_rows_keep_column_order() {
        let rows = vec![row(&[("title", json!("Heat")), ("year", json!(1995))])];
        assert_eq!(flatten_rows(rows), vec![json!(["Heat", 1995])]);
    }

    #[test]
    fn empty_result_is_empty() {
        assert!(flatten_rows(Vec::new()).is_empty());
    }
}
