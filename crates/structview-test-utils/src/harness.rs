// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service stack over a temp SQLite
//! database. `spawn_grpc()` serves it on an ephemeral loopback port.

use std::net::SocketAddr;
use std::sync::Arc;

use structview_config::StructviewConfig;
use structview_config::model::{HistoryConfig, PatternConfig, ServerConfig, StorageConfig};
use structview_core::{FeatureExtractor, RecordStore, StructviewError};
use structview_extract::RegexExtractor;
use structview_rpc::{GrpcServer, ServiceFacade};
use structview_storage::SqliteStorage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: StructviewConfig,
    store: Option<Arc<dyn RecordStore>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: StructviewConfig::default(),
            store: None,
        }
    }

    /// Add a custom detector.
    pub fn with_pattern(mut self, name: &str, pattern: &str) -> Self {
        self.config.extraction.patterns.push(PatternConfig {
            name: name.to_string(),
            pattern: pattern.to_string(),
        });
        self
    }

    /// Override history page-size limits.
    pub fn with_history_limits(mut self, default_limit: u32, max_limit: u32) -> Self {
        self.config.history = HistoryConfig {
            default_limit,
            max_limit,
        };
        self
    }

    /// Cap the extractor's input size.
    pub fn with_max_input_bytes(mut self, max: usize) -> Self {
        self.config.extraction.max_input_bytes = max;
        self
    }

    /// Replace the SQLite store with another implementation.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the test harness, creating and initializing all subsystems.
    pub async fn build(self) -> Result<TestHarness, StructviewError> {
        let temp_dir = tempfile::TempDir::new().map_err(StructviewError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        config.server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ServerConfig::default()
        };

        let store: Arc<dyn RecordStore> = match self.store {
            Some(store) => store,
            None => {
                let storage = SqliteStorage::new(config.storage.clone());
                storage.initialize().await?;
                Arc::new(storage)
            }
        };

        let extractor: Arc<dyn FeatureExtractor> =
            Arc::new(RegexExtractor::new(&config.extraction)?);
        let facade = Arc::new(ServiceFacade::new(
            extractor,
            Arc::clone(&store),
            config.history.clone(),
        ));

        Ok(TestHarness {
            store,
            facade,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over a temp database.
pub struct TestHarness {
    /// Record store (temp SQLite unless replaced).
    pub store: Arc<dyn RecordStore>,
    /// Facade shared by every transport.
    pub facade: Arc<ServiceFacade>,
    /// Effective configuration.
    pub config: StructviewConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings.
    pub async fn new() -> Result<Self, StructviewError> {
        Self::builder().build().await
    }

    /// Serve the facade over gRPC on an ephemeral loopback port.
    pub async fn spawn_grpc(&self) -> Result<RunningServer, StructviewError> {
        let server = GrpcServer::bind(&self.config.server, Arc::clone(&self.facade)).await?;
        let addr = server.local_addr()?;
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(server.serve(shutdown.clone()));
        Ok(RunningServer {
            addr,
            shutdown,
            handle,
        })
    }
}

/// A gRPC server running in a background task.
pub struct RunningServer {
    /// Bound loopback address.
    pub addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<(), StructviewError>>,
}

impl RunningServer {
    /// URI a tonic client can connect to.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Cancel the server and wait for it to drain.
    pub async fn stop(self) -> Result<(), StructviewError> {
        self.shutdown.cancel();
        self.handle
            .await
            .map_err(|e| StructviewError::Internal(format!("server task failed: {e}")))?
    }
}
