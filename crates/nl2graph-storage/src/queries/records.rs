//! records table queries. Each record is stored as its full JSON document.

use nl2graph_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::connection::sqe;

/// Insert or replace records. Returns the number written.
pub fn upsert_records(conn: &Connection, records: &[(String, String)]) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO records (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .map_err(sqe)?;
    let mut count = 0;
    for (id, data) in records {
        stmt.execute(params![id, data]).map_err(sqe)?;
        count += 1;
    }
    Ok(count)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT data FROM records WHERE id = ?1")
        .map_err(sqe)?;
    stmt.query_row(params![id], |row| row.get(0))
        .optional()
        .map_err(sqe)
}

pub fn exists(conn: &Connection, id: &str) -> Result<bool, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT 1 FROM records WHERE id = ?1")
        .map_err(sqe)?;
    stmt.exists(params![id]).map_err(sqe)
}

pub fn count(conn: &Connection) -> Result<usize, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get::<_, i64>(0))
        .map(|n| n as usize)
        .map_err(sqe)
}

/// All `(id, data)` pairs in id order.
pub fn all(conn: &Connection) -> Result<Vec<(String, String)>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, data FROM records ORDER BY id")
        .map_err(sqe)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(sqe)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqe)
}
