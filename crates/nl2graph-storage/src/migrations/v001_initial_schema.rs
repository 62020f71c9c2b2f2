//! v001: source records and stage results.

use nl2graph_core::errors::StorageError;
use rusqlite::Connection;

use crate::connection::sqe;

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS records (
            id   TEXT PRIMARY KEY,
            data TEXT NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS results (
            record_id  TEXT NOT NULL,
            method     TEXT NOT NULL,
            lang       TEXT NOT NULL,
            model      TEXT NOT NULL,
            gen        TEXT,
            exec       TEXT,
            eval       TEXT,
            updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
            PRIMARY KEY (record_id, method, lang, model)
        ) STRICT;
        ",
    )
    .map_err(sqe)
}
