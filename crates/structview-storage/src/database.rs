// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use structview_core::StructviewError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `StructviewError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StructviewError {
    StructviewError::storage(e)
}

/// Handle to the single SQLite connection backing the record store.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`, applies
    /// connection PRAGMAs and runs pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, StructviewError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StructviewError::storage)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(StructviewError::storage)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, StructviewError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(StructviewError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), StructviewError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    let mode: String =
                        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
                    debug!(journal_mode = %mode, "journal mode set");
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.busy_timeout(Duration::from_secs(5))?;
                conn.pragma_update(None, "foreign_keys", "ON")
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(migrations::run_migrations)
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => StructviewError::storage(other.to_string()),
            })
    }

    /// The serialized connection all queries go through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), StructviewError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                // The pragma reports (busy, log, checkpointed); only success matters.
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)
    }
}
