//! In-memory test doubles for `IResultStore` and `ISourceStore`.
//!
//! Used by pipeline tests to avoid creating real database files. The result
//! double applies the same cascade rule as the SQLite engine.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::errors::StorageError;
use crate::types::key::{ResultKey, RunConfig};
use crate::types::record::Record;
use crate::types::results::{EvaluationResult, ExecutionResult, GenerationResult, ResultRow};
use crate::types::stage::Stage;

use super::result_store::IResultStore;
use super::source_store::ISourceStore;

fn poisoned() -> StorageError {
    StorageError::SqliteError {
        message: "in-memory store lock poisoned".to_string(),
    }
}

/// Result store backed by a `BTreeMap`, ordered by key.
#[derive(Default)]
pub struct InMemoryResultStore {
    rows: Mutex<BTreeMap<ResultKey, ResultRow>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_row<F>(&self, key: &ResultKey, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut ResultRow),
    {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let row = rows
            .entry(key.clone())
            .or_insert_with(|| ResultRow::empty(key));
        f(row);
        Ok(())
    }

    fn collect<P>(&self, pred: P) -> Result<Vec<ResultRow>, StorageError>
    where
        P: Fn(&ResultRow) -> bool,
    {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.values().filter(|r| pred(r)).cloned().collect())
    }
}

impl IResultStore for InMemoryResultStore {
    fn get(&self, key: &ResultKey) -> Result<Option<ResultRow>, StorageError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get(key).cloned())
    }

    fn exists(&self, key: &ResultKey) -> Result<bool, StorageError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.contains_key(key))
    }

    fn save_generation(&self, key: &ResultKey, gen: &GenerationResult) -> Result<(), StorageError> {
        self.with_row(key, |row| {
            row.gen = Some(gen.clone());
            row.exec = None;
            row.eval = None;
        })
    }

    fn save_execution(&self, key: &ResultKey, exec: &ExecutionResult) -> Result<(), StorageError> {
        self.with_row(key, |row| {
            row.exec = Some(exec.clone());
            row.eval = None;
        })
    }

    fn save_evaluation(&self, key: &ResultKey, eval: &EvaluationResult) -> Result<(), StorageError> {
        self.with_row(key, |row| row.eval = Some(*eval))
    }

    fn clear_stage(&self, run: &RunConfig, stage: Stage) -> Result<usize, StorageError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut affected = 0;
        for row in rows.values_mut().filter(|r| r.key().run_config() == *run) {
            let mut touched = false;
            for cleared in stage.cascade() {
                touched |= match cleared {
                    Stage::Gen => row.gen.take().is_some(),
                    Stage::Exec => row.exec.take().is_some(),
                    Stage::Eval => row.eval.take().is_some(),
                };
            }
            if touched {
                affected += 1;
            }
        }
        Ok(affected)
    }

    fn iter_by_config(&self, run: &RunConfig) -> Result<Vec<ResultRow>, StorageError> {
        self.collect(|r| r.key().run_config() == *run)
    }

    fn iter_by_record(&self, record_id: &str) -> Result<Vec<ResultRow>, StorageError> {
        self.collect(|r| r.record_id == record_id)
    }

    fn iter_all(&self) -> Result<Vec<ResultRow>, StorageError> {
        self.collect(|_| true)
    }

    fn count(&self) -> Result<usize, StorageError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.len())
    }
}

/// Source store over a fixed set of records.
#[derive(Default)]
pub struct InMemorySourceStore {
    records: BTreeMap<String, Record>,
}

impl InMemorySourceStore {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}

impl ISourceStore for InMemorySourceStore {
    fn get(&self, id: &str) -> Result<Option<Record>, StorageError> {
        Ok(self.records.get(id).cloned())
    }

    fn exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.records.contains_key(id))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.records.len())
    }

    fn iter_all(&self) -> Result<Vec<Record>, StorageError> {
        Ok(self.records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::key::Method;
    use serde_json::json;

    fn run() -> RunConfig {
        RunConfig::new(Method::Llm, "cypher", "gpt-4o")
    }

    #[test]
    fn generation_resets_downstream_stages() {
        let store = InMemoryResultStore::new();
        let key = run().key_for("q1");
        store.save_generation(&key, &GenerationResult::default()).unwrap();
        store
            .save_execution(&key, &ExecutionResult::succeeded(vec![json!("a")]))
            .unwrap();
        store.save_evaluation(&key, &EvaluationResult::default()).unwrap();

        store.save_generation(&key, &GenerationResult::default()).unwrap();
        let row = store.get(&key).unwrap().unwrap();
        assert!(row.gen.is_some());
        assert!(row.exec.is_none());
        assert!(row.eval.is_none());
    }

    #[test]
    fn clear_counts_only_rows_with_cleared_values() {
        let store = InMemoryResultStore::new();
        let key = |id| run().key_for(id);
        store.save_generation(&key("q1"), &GenerationResult::default()).unwrap();
        store
            .save_execution(&key("q1"), &ExecutionResult::failed("x"))
            .unwrap();
        store.save_generation(&key("q2"), &GenerationResult::default()).unwrap();

        assert_eq!(store.clear_stage(&run(), Stage::Exec).unwrap(), 1);
        assert_eq!(store.clear_stage(&run(), Stage::Exec).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn pending_evaluation_includes_missing_rows() {
        let source = InMemorySourceStore::new(vec![
            Record::new("q1", "a", vec![]),
            Record::new("q2", "b", vec![]),
        ]);
        let store = InMemoryResultStore::new();
        let key = run().key_for("q1");
        store.save_evaluation(&key, &EvaluationResult::default()).unwrap();

        let pending = store.iter_pending_evaluation(&source, &run()).unwrap();
        let ids: Vec<_> = pending.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["q2"]);
    }
}
