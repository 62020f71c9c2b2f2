//! `DatabaseManager`: one serialized write connection plus a round-robin
//! pool of read-only connections.
//!
//! In-memory databases are private to their connection, so an in-memory
//! manager has no read pool and routes reads to the writer.

pub mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use nl2graph_core::config::StorageConfig;
use nl2graph_core::errors::StorageError;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::migrations;

pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

fn poisoned(which: &str) -> StorageError {
    StorageError::SqliteError {
        message: format!("{which} connection lock poisoned"),
    }
}

pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open (creating if needed) a file-backed database and run migrations.
    pub fn open(path: &Path, config: &StorageConfig) -> Result<Self, StorageError> {
        let busy = config.effective_busy_timeout_ms();
        let writer = Connection::open(path).map_err(sqe)?;
        pragmas::apply_pragmas(&writer, busy)?;
        migrations::run_migrations(&writer)?;

        let pool_size = config.effective_read_pool_size();
        let mut readers = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .map_err(sqe)?;
            pragmas::apply_read_pragmas(&conn, busy)?;
            readers.push(Mutex::new(conn));
        }
        debug!(path = %path.display(), readers = pool_size, "database opened");

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            next_reader: AtomicUsize::new(0),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing). Reads share the writer.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(sqe)?;
        pragmas::apply_pragmas(&writer, StorageConfig::default().effective_busy_timeout_ms())?;
        migrations::run_migrations(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
            path: None,
        })
    }

    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }
        let idx = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx].lock().map_err(|_| poisoned("reader"))?;
        f(&conn)
    }

    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.writer.lock().map_err(|_| poisoned("writer"))?;
        f(&conn)
    }

    /// WAL checkpoint. No-op for in-memory databases.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        if self.path.is_none() {
            return Ok(());
        }
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(sqe)
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
