//! Low-level database operations and schema management.

pub use crate::errors::StoreError;
use log::warn;
use rusqlite::Connection;
use std::path::Path;

/// Database connection wrapper with schema management.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    db_path: Option<String>,
}

impl Database {
    /// Open (or create) a database at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn =
            Connection::open(&path_str).map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA journal_mode = WAL;",
        )
        .map_err(|e| StoreError::Initialization(e.to_string()))?;

        let db = Self {
            conn,
            db_path: Some(path_str),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Database that lives only as long as this value.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))?;
        let db = Self {
            conn,
            db_path: None,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "-- One row per completed conversion
                CREATE TABLE IF NOT EXISTS records (
                    user_id TEXT NOT NULL,
                    id INTEGER NOT NULL,
                    operation TEXT NOT NULL,   -- 'encoded' or 'decoded'
                    filename TEXT NOT NULL,
                    size INTEGER NOT NULL,     -- original file size in bytes
                    dna_length INTEGER,        -- encodes only
                    timestamp TEXT NOT NULL    -- RFC 3339, milliseconds, UTC
                );

                CREATE INDEX IF NOT EXISTS idx_records_user ON records(user_id, timestamp);",
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Path on disk, `None` for in-memory databases.
    pub fn path(&self) -> Option<&str> {
        self.db_path.as_deref()
    }

    /// Close the database and clean up WAL files.
    pub fn close(self) -> Result<(), StoreError> {
        if let Err(e) = self.conn.execute_batch(
            "PRAGMA wal_checkpoint(TRUNCATE);
             PRAGMA journal_mode = DELETE;",
        ) {
            warn!("failed to checkpoint/truncate WAL: {e}");
        }

        self.conn
            .close()
            .map_err(|(_conn, e)| StoreError::Close(e.to_string()))?;

        let Some(path) = self.db_path else {
            return Ok(());
        };
        for suffix in &["-wal", "-shm"] {
            let fname = format!("{path}{suffix}");
            if let Err(e) = std::fs::remove_file(&fname) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove {fname}: {e}");
                }
            }
        }
        Ok(())
    }
}
