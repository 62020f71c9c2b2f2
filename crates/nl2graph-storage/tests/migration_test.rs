//! Migration tests: fresh schema, idempotent re-run, newer-database refusal.

use nl2graph_core::errors::StorageError;
use nl2graph_storage::connection::pragmas::apply_pragmas;
use nl2graph_storage::migrations;
use rusqlite::Connection;

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn fresh_database_reaches_latest_version() {
    let conn = Connection::open_in_memory().unwrap();
    apply_pragmas(&conn, 1_000).unwrap();
    assert_eq!(migrations::run_migrations(&conn).unwrap(), migrations::LATEST_VERSION);
    assert_eq!(migrations::current_version(&conn).unwrap(), migrations::LATEST_VERSION);

    let columns = table_columns(&conn, "results");
    for expected in ["record_id", "method", "lang", "model", "gen", "exec", "eval"] {
        assert!(columns.contains(&expected.to_string()), "missing column {expected}");
    }
    assert_eq!(table_columns(&conn, "records"), vec!["id", "data"]);
}

#[test]
fn rerunning_migrations_is_a_no_op() {
    let conn = Connection::open_in_memory().unwrap();
    migrations::run_migrations(&conn).unwrap();
    assert_eq!(migrations::run_migrations(&conn).unwrap(), 0);
}

#[test]
fn newer_schema_is_refused() {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "user_version", migrations::LATEST_VERSION + 1)
        .unwrap();
    let err = migrations::run_migrations(&conn).unwrap_err();
    assert!(matches!(err, StorageError::MigrationFailed { .. }));
}
