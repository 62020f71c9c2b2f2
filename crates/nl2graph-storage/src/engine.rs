//! `ResultStorageEngine` and `SourceStorageEngine`: the SQLite
//! implementations of the core storage traits.
//!
//! Both wrap a `DatabaseManager`. All reads go through `with_reader()`, all
//! writes through `with_writer()`. Each `save_*` is written through to the
//! database before returning, so a crash loses at most the record in flight.

use std::path::Path;

use nl2graph_core::config::StorageConfig;
use nl2graph_core::errors::StorageError;
use nl2graph_core::traits::storage::{IResultStore, ISourceStore};
use nl2graph_core::types::key::{Method, ResultKey, RunConfig};
use nl2graph_core::types::record::Record;
use nl2graph_core::types::results::{
    EvaluationResult, ExecutionResult, GenerationResult, ResultRow,
};
use nl2graph_core::types::stage::Stage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::connection::{sqe, DatabaseManager};
use crate::queries;
use crate::queries::results::{KeyParams, ResultRecord};

// ─── Helpers ────────────────────────────────────────────────────────────────

fn key_params(key: &ResultKey) -> KeyParams<'_> {
    KeyParams {
        record_id: &key.record_id,
        method: key.method.as_str(),
        lang: &key.lang,
        model: &key.model,
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        message: e.to_string(),
    })
}

fn decode_column<T: DeserializeOwned>(
    record: &ResultRecord,
    column: &str,
    raw: Option<&str>,
) -> Result<Option<T>, StorageError> {
    raw.map(|json| {
        serde_json::from_str(json).map_err(|e| StorageError::DbCorrupt {
            details: format!(
                "results.{column} for {}@{}/{}/{}: {e}",
                record.record_id, record.method, record.lang, record.model
            ),
        })
    })
    .transpose()
}

impl TryFrom<ResultRecord> for ResultRow {
    type Error = StorageError;

    fn try_from(r: ResultRecord) -> Result<Self, Self::Error> {
        let method: Method = r.method.parse().map_err(|_| StorageError::DbCorrupt {
            details: format!("results.method '{}' for {}", r.method, r.record_id),
        })?;
        let gen = decode_column(&r, "gen", r.gen.as_deref())?;
        let exec = decode_column(&r, "exec", r.exec.as_deref())?;
        let eval = decode_column(&r, "eval", r.eval.as_deref())?;
        Ok(ResultRow {
            record_id: r.record_id,
            method,
            lang: r.lang,
            model: r.model,
            gen,
            exec,
            eval,
        })
    }
}

fn decode_rows(records: Vec<ResultRecord>) -> Result<Vec<ResultRow>, StorageError> {
    records.into_iter().map(ResultRow::try_from).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Result store
// ═══════════════════════════════════════════════════════════════════════════

/// Stage results keyed by `(record_id, method, lang, model)`.
pub struct ResultStorageEngine {
    db: DatabaseManager,
}

impl ResultStorageEngine {
    /// Open a file-backed result store. Runs migrations and applies pragmas.
    pub fn open(path: &Path, config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path, config)?,
        })
    }

    /// Open an in-memory result store (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.db.checkpoint()
    }

    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    /// Raw read access for operations not covered by a trait method.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StorageError>,
    {
        self.db.with_reader(f)
    }

    /// Raw write access for operations not covered by a trait method.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StorageError>,
    {
        self.db.with_writer(f)
    }
}

impl IResultStore for ResultStorageEngine {
    fn get(&self, key: &ResultKey) -> Result<Option<ResultRow>, StorageError> {
        let record = self
            .db
            .with_reader(|conn| queries::results::get(conn, key_params(key)))?;
        record.map(ResultRow::try_from).transpose()
    }

    fn exists(&self, key: &ResultKey) -> Result<bool, StorageError> {
        self.db
            .with_reader(|conn| queries::results::exists(conn, key_params(key)))
    }

    fn save_generation(&self, key: &ResultKey, gen: &GenerationResult) -> Result<(), StorageError> {
        let json = encode(gen)?;
        self.db
            .with_writer(|conn| queries::results::upsert_generation(conn, key_params(key), &json))
    }

    fn save_execution(&self, key: &ResultKey, exec: &ExecutionResult) -> Result<(), StorageError> {
        let json = encode(exec)?;
        self.db
            .with_writer(|conn| queries::results::upsert_execution(conn, key_params(key), &json))
    }

    fn save_evaluation(&self, key: &ResultKey, eval: &EvaluationResult) -> Result<(), StorageError> {
        let json = encode(eval)?;
        self.db
            .with_writer(|conn| queries::results::upsert_evaluation(conn, key_params(key), &json))
    }

    fn clear_stage(&self, run: &RunConfig, stage: Stage) -> Result<usize, StorageError> {
        let affected = self.db.with_writer(|conn| {
            queries::results::clear_stage(conn, run.method.as_str(), &run.lang, &run.model, stage)
        })?;
        info!(run = %run, stage = %stage, affected, "cleared stage");
        Ok(affected)
    }

    fn iter_by_config(&self, run: &RunConfig) -> Result<Vec<ResultRow>, StorageError> {
        let records = self.db.with_reader(|conn| {
            queries::results::by_config(conn, run.method.as_str(), &run.lang, &run.model)
        })?;
        decode_rows(records)
    }

    fn iter_by_record(&self, record_id: &str) -> Result<Vec<ResultRow>, StorageError> {
        let records = self
            .db
            .with_reader(|conn| queries::results::by_record(conn, record_id))?;
        decode_rows(records)
    }

    fn iter_all(&self) -> Result<Vec<ResultRow>, StorageError> {
        let records = self.db.with_reader(queries::results::all)?;
        decode_rows(records)
    }

    fn count(&self) -> Result<usize, StorageError> {
        self.db.with_reader(queries::results::count)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Source store
// ═══════════════════════════════════════════════════════════════════════════

/// Input records keyed by `id`, stored as JSON documents.
pub struct SourceStorageEngine {
    db: DatabaseManager,
}

impl SourceStorageEngine {
    pub fn open(path: &Path, config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path, config)?,
        })
    }

    /// Open an in-memory source store (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    /// Load a JSON array of records keyed by their `id` field. Numeric ids
    /// are stored as strings. Existing ids are replaced. Returns the total
    /// record count afterwards.
    pub fn init_from_json(&self, path: &Path) -> Result<usize, StorageError> {
        let text = std::fs::read_to_string(path).map_err(|e| StorageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let items: Vec<Value> = serde_json::from_str(&text).map_err(|e| StorageError::Serialization {
            message: format!("{}: {e}", path.display()),
        })?;

        let mut rows = Vec::with_capacity(items.len());
        for (idx, mut item) in items.into_iter().enumerate() {
            let id = match item.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(StorageError::Serialization {
                        message: format!("{}: item {idx} has no usable \"id\"", path.display()),
                    })
                }
            };
            if let Some(obj) = item.as_object_mut() {
                obj.insert("id".to_string(), Value::String(id.clone()));
            }
            let record: Record = serde_json::from_value(item).map_err(|e| StorageError::Serialization {
                message: format!("{}: record {id}: {e}", path.display()),
            })?;
            rows.push((id, encode(&record)?));
        }

        let written = self.db.with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(sqe)?;
            let n = queries::records::upsert_records(&tx, &rows)?;
            tx.commit().map_err(sqe)?;
            Ok(n)
        })?;
        debug!(path = %path.display(), written, "loaded source records");
        self.count()
    }

    pub fn insert_records(&self, records: &[Record]) -> Result<usize, StorageError> {
        let rows = records
            .iter()
            .map(|r| -> Result<(String, String), StorageError> { Ok((r.id.clone(), encode(r)?)) })
            .collect::<Result<Vec<_>, _>>()?;
        self.db
            .with_writer(|conn| queries::records::upsert_records(conn, &rows))
    }
}

fn decode_record(id: &str, data: &str) -> Result<Record, StorageError> {
    serde_json::from_str(data).map_err(|e| StorageError::DbCorrupt {
        details: format!("records.data for {id}: {e}"),
    })
}

impl ISourceStore for SourceStorageEngine {
    fn get(&self, id: &str) -> Result<Option<Record>, StorageError> {
        let data = self.db.with_reader(|conn| queries::records::get(conn, id))?;
        data.map(|d| decode_record(id, &d)).transpose()
    }

    fn exists(&self, id: &str) -> Result<bool, StorageError> {
        self.db.with_reader(|conn| queries::records::exists(conn, id))
    }

    fn count(&self) -> Result<usize, StorageError> {
        self.db.with_reader(queries::records::count)
    }

    fn iter_all(&self) -> Result<Vec<Record>, StorageError> {
        let rows = self.db.with_reader(queries::records::all)?;
        rows.iter().map(|(id, data)| decode_record(id, data)).collect()
    }
}
