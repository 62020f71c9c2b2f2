//! Connection pragmas applied to every connection the manager opens.

use std::time::Duration;

use nl2graph_core::errors::StorageError;
use rusqlite::Connection;

use super::sqe;

/// WAL journal, NORMAL sync, foreign keys, busy timeout.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(sqe)?;
    conn.pragma_update(None, "synchronous", "NORMAL").map_err(sqe)?;
    conn.pragma_update(None, "foreign_keys", "ON").map_err(sqe)?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(sqe)?;
    Ok(())
}

/// Pragmas for read-only pool connections.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    conn.pragma_update(None, "query_only", "ON").map_err(sqe)?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(sqe)?;
    Ok(())
}
