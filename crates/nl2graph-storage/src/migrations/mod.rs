//! Migration runner: `PRAGMA user_version` tracking, forward-only,
//! transactional per migration.

mod v001_initial_schema;
mod v002_result_indexes;

use nl2graph_core::errors::StorageError;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::connection::sqe;

pub const LATEST_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> Result<(), StorageError>;

const MIGRATIONS: [(u32, &str, MigrationFn); 2] = [
    (1, "initial_schema", v001_initial_schema::migrate),
    (2, "result_indexes", v002_result_indexes::migrate),
];

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(sqe)
}

/// Run all pending migrations. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> Result<u32, StorageError> {
    let current = current_version(conn)?;
    if current > LATEST_VERSION {
        return Err(StorageError::MigrationFailed {
            version: current,
            message: format!("database is newer than this build (v{LATEST_VERSION})"),
        });
    }
    if current == LATEST_VERSION {
        debug!("database schema is up to date (v{current})");
        return Ok(0);
    }

    info!("running migrations: v{} → v{}", current, LATEST_VERSION);
    let mut applied = 0;
    for &(version, name, migrate_fn) in &MIGRATIONS {
        if version <= current {
            continue;
        }
        let fail = |message: String| StorageError::MigrationFailed { version, message };

        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| fail(format!("begin: {e}")))?;
        let result = migrate_fn(conn).and_then(|()| {
            conn.pragma_update(None, "user_version", version)
                .map_err(sqe)
        });
        match result {
            Ok(()) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| fail(format!("commit: {e}")))?;
                info!("applied migration v{version:03}: {name}");
                applied += 1;
            }
            Err(e) => {
                warn!("migration v{version:03} failed: {e}, rolling back");
                let _ = conn.execute_batch("ROLLBACK");
                return Err(fail(e.to_string()));
            }
        }
    }
    Ok(applied)
}
