// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store that is always down.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use structview_core::{
    AdapterType, ExtractedRecord, HealthStatus, HistoryPage, HistoryQuery, NewRecord,
    PluginAdapter, RecordId, RecordStore, StructviewError,
};

/// Every call fails with a storage error. Counts the calls it refused.
#[derive(Debug, Default)]
pub struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of record operations attempted.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn refuse(&self) -> StructviewError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StructviewError::storage("database is unavailable")
    }
}

#[async_trait]
impl PluginAdapter for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StructviewError> {
        Ok(HealthStatus::Unhealthy("database is unavailable".into()))
    }

    async fn shutdown(&self) -> Result<(), StructviewError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn initialize(&self) -> Result<(), StructviewError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StructviewError> {
        Ok(())
    }

    async fn save(&self, _record: NewRecord) -> Result<RecordId, StructviewError> {
        Err(self.refuse())
    }

    async fn history(&self, _query: &HistoryQuery) -> Result<HistoryPage, StructviewError> {
        Err(self.refuse())
    }

    async fn get(&self, _id: &RecordId) -> Result<ExtractedRecord, StructviewError> {
        Err(self.refuse())
    }
}
