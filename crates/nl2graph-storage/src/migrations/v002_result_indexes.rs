//! v002: index for run-configuration scans (`iter_by_config`, `clear_stage`).

use nl2graph_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sqe;

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_results_config ON results(method, lang, model);",
    )
    .map_err(sqe)
}
