//! results table queries.
//!
//! Each `upsert_*` is a single statement that writes one stage document and
//! nulls the stages downstream of it, so the cascade is atomic per key.

use nl2graph_core::errors::StorageError;
use nl2graph_core::types::stage::Stage;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::connection::sqe;

/// A results row as stored, JSON columns undecoded.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub record_id: String,
    pub method: String,
    pub lang: String,
    pub model: String,
    pub gen: Option<String>,
    pub exec: Option<String>,
    pub eval: Option<String>,
}

/// Borrowed key columns.
#[derive(Debug, Clone, Copy)]
pub struct KeyParams<'a> {
    pub record_id: &'a str,
    pub method: &'a str,
    pub lang: &'a str,
    pub model: &'a str,
}

const SELECT_COLUMNS: &str = "SELECT record_id, method, lang, model, gen, exec, eval FROM results";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ResultRecord> {
    Ok(ResultRecord {
        record_id: row.get(0)?,
        method: row.get(1)?,
        lang: row.get(2)?,
        model: row.get(3)?,
        gen: row.get(4)?,
        exec: row.get(5)?,
        eval: row.get(6)?,
    })
}

/// Write `gen`, resetting `exec` and `eval`.
pub fn upsert_generation(conn: &Connection, key: KeyParams<'_>, gen: &str) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO results (record_id, method, lang, model, gen, exec, eval)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)
         ON CONFLICT(record_id, method, lang, model) DO UPDATE SET
             gen = excluded.gen,
             exec = NULL,
             eval = NULL,
             updated_at = excluded.updated_at",
    )
    .and_then(|mut stmt| stmt.execute(params![key.record_id, key.method, key.lang, key.model, gen]))
    .map_err(sqe)?;
    Ok(())
}

/// Write `exec`, resetting `eval`. Creates the row with `gen = NULL` if absent.
pub fn upsert_execution(conn: &Connection, key: KeyParams<'_>, exec: &str) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO results (record_id, method, lang, model, gen, exec, eval)
         VALUES (?1, ?2, ?3, ?4, NULL, ?5, NULL)
         ON CONFLICT(record_id, method, lang, model) DO UPDATE SET
             exec = excluded.exec,
             eval = NULL,
             updated_at = excluded.updated_at",
    )
    .and_then(|mut stmt| stmt.execute(params![key.record_id, key.method, key.lang, key.model, exec]))
    .map_err(sqe)?;
    Ok(())
}

/// Write `eval` only.
pub fn upsert_evaluation(conn: &Connection, key: KeyParams<'_>, eval: &str) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO results (record_id, method, lang, model, gen, exec, eval)
         VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5)
         ON CONFLICT(record_id, method, lang, model) DO UPDATE SET
             eval = excluded.eval,
             updated_at = excluded.updated_at",
    )
    .and_then(|mut stmt| stmt.execute(params![key.record_id, key.method, key.lang, key.model, eval]))
    .map_err(sqe)?;
    Ok(())
}

/// Null `stage` and its downstream columns for one run configuration.
/// Counts only rows that had something to clear.
pub fn clear_stage(
    conn: &Connection,
    method: &str,
    lang: &str,
    model: &str,
    stage: Stage,
) -> Result<usize, StorageError> {
    let columns = stage.cascade();
    let set_clause = columns
        .iter()
        .map(|s| format!("{} = NULL", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let any_set = columns
        .iter()
        .map(|s| format!("{} IS NOT NULL", s.as_str()))
        .collect::<Vec<_>>()
        .join(" OR ");
    let sql = format!(
        "UPDATE results SET {set_clause}
         WHERE method = ?1 AND lang = ?2 AND model = ?3 AND ({any_set})"
    );
    conn.execute(&sql, params![method, lang, model]).map_err(sqe)
}

pub fn get(conn: &Connection, key: KeyParams<'_>) -> Result<Option<ResultRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT_COLUMNS} WHERE record_id = ?1 AND method = ?2 AND lang = ?3 AND model = ?4"
        ))
        .map_err(sqe)?;
    stmt.query_row(params![key.record_id, key.method, key.lang, key.model], map_row)
        .optional()
        .map_err(sqe)
}

pub fn exists(conn: &Connection, key: KeyParams<'_>) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM results WHERE record_id = ?1 AND method = ?2 AND lang = ?3 AND model = ?4",
        )
        .map_err(sqe)?;
    stmt.exists(params![key.record_id, key.method, key.lang, key.model])
        .map_err(sqe)
}

pub fn by_config(
    conn: &Connection,
    method: &str,
    lang: &str,
    model: &str,
) -> Result<Vec<ResultRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT_COLUMNS} WHERE method = ?1 AND lang = ?2 AND model = ?3 ORDER BY record_id"
        ))
        .map_err(sqe)?;
    let rows = stmt
        .query_map(params![method, lang, model], map_row)
        .map_err(sqe)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
}

pub fn by_record(conn: &Connection, record_id: &str) -> Result<Vec<ResultRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT_COLUMNS} WHERE record_id = ?1 ORDER BY method, lang, model"
        ))
        .map_err(sqe)?;
    let rows = stmt.query_map(params![record_id], map_row).map_err(sqe)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
}

pub fn all(conn: &Connection) -> Result<Vec<ResultRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT_COLUMNS} ORDER BY record_id, method, lang, model"
        ))
        .map_err(sqe)?;
    let rows = stmt.query_map([], map_row).map_err(sqe)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
}

pub fn count(conn: &Connection) -> Result<usize, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get::<_, i64>(0))
        .map(|n| n as usize)
        .map_err(sqe)
}
