// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use structview_config::model::StorageConfig;
use structview_core::{
    AdapterType, ExtractedRecord, HealthStatus, HistoryPage, HistoryQuery, NewRecord,
    PluginAdapter, RecordId, RecordStore, StructviewError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed record store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`RecordStore::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](RecordStore::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, StructviewError> {
        self.db
            .get()
            .ok_or_else(|| StructviewError::storage("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StructviewError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StructviewError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), StructviewError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| StructviewError::storage("storage already initialized"))?;
        info!(path = %self.config.database_path, "record storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), StructviewError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn save(&self, record: NewRecord) -> Result<RecordId, StructviewError> {
        record.validate()?;
        let db = self.db()?;

        let id = record
            .id
            .unwrap_or_else(|| RecordId(uuid::Uuid::new_v4().to_string()));
        let created_at = record
            .created_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

        queries::records::insert_record(
            db,
            ExtractedRecord {
                id: id.clone(),
                page_url: record.page_url,
                source_text: record.source_text,
                extracted_json: record.extracted_json,
                created_at,
            },
        )
        .await?;
        debug!(id = %id, created_at, "record saved");
        Ok(id)
    }

    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, StructviewError> {
        if query.limit == 0 {
            return Err(StructviewError::Invalid(
                "history limit must be resolved before reaching storage".into(),
            ));
        }
        queries::records::list_history(self.db()?, query.limit, query.cursor.clone()).await
    }

    async fn get(&self, id: &RecordId) -> Result<ExtractedRecord, StructviewError> {
        queries::records::get_record(self.db()?, id).await
    }
}
