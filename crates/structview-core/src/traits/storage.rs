// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::StructviewError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ExtractedRecord, HistoryPage, HistoryQuery, NewRecord, RecordId};

/// Adapter for extraction record persistence.
///
/// Implementations serialize id assignment and duplicate checks through a
/// single point so concurrent saves never produce colliding ids, and make a
/// record visible to every read that starts after `save` returns.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), StructviewError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), StructviewError>;

    /// Persists a record atomically and returns its id.
    ///
    /// Assigns an id when the record has none. Fails with `Duplicate` when a
    /// caller-supplied id already exists and with `Invalid` when the record
    /// is malformed.
    async fn save(&self, record: NewRecord) -> Result<RecordId, StructviewError>;

    /// Lists records ordered by `created_at` descending, ties broken by id ascending.
    ///
    /// `query.limit` must already be resolved to a positive value.
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, StructviewError>;

    /// Fetches a single record, failing with `NotFound` when absent.
    async fn get(&self, id: &RecordId) -> Result<ExtractedRecord, StructviewError>;
}
