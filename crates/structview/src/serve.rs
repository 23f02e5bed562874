// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `structview serve` command implementation.
//!
//! Opens the record store, builds the extractor and facade, and serves gRPC
//! (plus the HTTP gateway when enabled) until SIGINT or SIGTERM.

use std::sync::Arc;

use structview_config::StructviewConfig;
use structview_core::{FeatureExtractor, RecordStore, StructviewError};
use structview_extract::RegexExtractor;
use structview_gateway::{AuthConfig, GatewayServer, GatewayState};
use structview_rpc::{GrpcServer, ServiceFacade};
use structview_storage::SqliteStorage;
use tracing::{error, info, warn};

use crate::shutdown;

pub async fn run_serve(config: StructviewConfig) -> Result<(), StructviewError> {
    info!(service = %config.service.name, "starting structview serve");

    let store: Arc<dyn RecordStore> = Arc::new(SqliteStorage::new(config.storage.clone()));
    store.initialize().await?;

    let extractor: Arc<dyn FeatureExtractor> = Arc::new(RegexExtractor::new(&config.extraction)?);
    let facade = Arc::new(ServiceFacade::new(
        extractor,
        Arc::clone(&store),
        config.history.clone(),
    ));

    let shutdown = shutdown::install_signal_handler();

    let grpc = GrpcServer::bind(&config.server, Arc::clone(&facade)).await?;

    let gateway = if config.gateway.enabled {
        let state = GatewayState {
            facade: Arc::clone(&facade),
            auth: AuthConfig {
                bearer_token: config.gateway.bearer_token.clone(),
            },
        };
        let server = GatewayServer::bind(&config.gateway, state).await?;
        Some(tokio::spawn(server.serve(shutdown.clone())))
    } else {
        info!("HTTP gateway disabled by configuration");
        None
    };

    let served = grpc.serve(shutdown.clone()).await;
    if let Err(e) = &served {
        error!(error = %e, "gRPC server failed");
    }
    // Stop the gateway too when gRPC exits on its own.
    shutdown.cancel();

    if let Some(handle) = gateway {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "gateway exited with error"),
            Err(e) => warn!(error = %e, "gateway task panicked"),
        }
    }

    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close record storage cleanly");
    }

    info!("structview serve shutdown complete");
    served
}
