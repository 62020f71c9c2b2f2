//! `IResultStore` trait: keyed stage results with cascade invalidation.
//!
//! Maps to `nl2graph-storage/src/queries/results.rs`.

use std::path::Path;
use std::sync::Arc;

use crate::errors::StorageError;
use crate::types::key::{ResultKey, RunConfig};
use crate::types::record::Record;
use crate::types::results::{EvaluationResult, ExecutionResult, GenerationResult, ResultRow};
use crate::types::stage::Stage;

use super::source_store::ISourceStore;

/// Durable map from `ResultKey` to a `{gen, exec, eval}` row.
///
/// Implementations own the cascade rule: writing `gen` nulls `exec` and
/// `eval`, writing `exec` nulls `eval`, writing `eval` touches nothing else.
/// Every write is atomic per key. An absent row reads as `None` and is
/// equivalent to a row with all three stages null.
pub trait IResultStore: Send + Sync {
    fn get(&self, key: &ResultKey) -> Result<Option<ResultRow>, StorageError>;

    /// Whether a row exists for `key`, regardless of which stages are set.
    fn exists(&self, key: &ResultKey) -> Result<bool, StorageError>;

    fn save_generation(&self, key: &ResultKey, gen: &GenerationResult) -> Result<(), StorageError>;

    /// Creates the row with `gen = null` if it is absent.
    fn save_execution(&self, key: &ResultKey, exec: &ExecutionResult) -> Result<(), StorageError>;

    fn save_evaluation(&self, key: &ResultKey, eval: &EvaluationResult) -> Result<(), StorageError>;

    /// Null `stage` and everything downstream of it for every row of `run`.
    /// Returns the number of rows that had a non-null value in any of the
    /// cleared fields.
    fn clear_stage(&self, run: &RunConfig, stage: Stage) -> Result<usize, StorageError>;

    fn iter_by_config(&self, run: &RunConfig) -> Result<Vec<ResultRow>, StorageError>;

    fn iter_by_record(&self, record_id: &str) -> Result<Vec<ResultRow>, StorageError>;

    fn iter_all(&self) -> Result<Vec<ResultRow>, StorageError>;

    fn count(&self) -> Result<usize, StorageError>;

    /// Write every row as a pretty-printed JSON array. Returns the row count.
    fn export(&self, path: &Path) -> Result<usize, StorageError> {
        let rows = self.iter_all()?;
        let json = serde_json::to_string_pretty(&rows).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| StorageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(rows.len())
    }

    /// Source records with no row under `run`, or a row without `eval`.
    fn iter_pending_evaluation(
        &self,
        source: &dyn ISourceStore,
        run: &RunConfig,
    ) -> Result<Vec<Record>, StorageError> {
        let mut pending = Vec::new();
        for record in source.iter_all()? {
            match self.get(&run.key_for(&record.id))? {
                Some(row) if row.eval.is_some() => {}
                _ => pending.push(record),
            }
        }
        Ok(pending)
    }
}

// ─── Arc blanket impl ───────────────────────────────────────────────

impl<T: IResultStore + ?Sized> IResultStore for Arc<T> {
    fn get(&self, key: &ResultKey) -> Result<Option<ResultRow>, StorageError> {
        (**self).get(key)
    }
    fn exists(&self, key: &ResultKey) -> Result<bool, StorageError> {
        (**self).exists(key)
    }
    fn save_generation(&self, key: &ResultKey, gen: &GenerationResult) -> Result<(), StorageError> {
        (**self).save_generation(key, gen)
    }
    fn save_execution(&self, key: &ResultKey, exec: &ExecutionResult) -> Result<(), StorageError> {
        (**self).save_execution(key, exec)
    }
    fn save_evaluation(&self, key: &ResultKey, eval: &EvaluationResult) -> Result<(), StorageError> {
        (**self).save_evaluation(key, eval)
    }
    fn clear_stage(&self, run: &RunConfig, stage: Stage) -> Result<usize, StorageError> {
        (**self).clear_stage(run, stage)
    }
    fn iter_by_config(&self, run: &RunConfig) -> Result<Vec<ResultRow>, StorageError> {
        (**self).iter_by_config(run)
    }
    fn iter_by_record(&self, record_id: &str) -> Result<Vec<ResultRow>, StorageError> {
        (**self).iter_by_record(record_id)
    }
    fn iter_all(&self) -> Result<Vec<ResultRow>, StorageError> {
        (**self).iter_all()
    }
    fn count(&self) -> Result<usize, StorageError> {
        (**self).count()
    }
    fn export(&self, path: &Path) -> Result<usize, StorageError> {
        (**self).export(path)
    }
    fn iter_pending_evaluation(
        &self,
        source: &dyn ISourceStore,
        run: &RunConfig,
    ) -> Result<Vec<Record>, StorageError> {
        (**self).iter_pending_evaluation(source, run)
    }
}
