// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! gRPC listener lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use structview_config::model::ServerConfig;
use structview_core::StructviewError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::transport::server::TcpIncoming;
use tracing::info;

use crate::facade::ServiceFacade;
use crate::grpc::GrpcService;

/// Target of the `listening on :<port>` line. Callers wait for that line, so
/// log filters should always let this target through at `info`.
pub const READY_TARGET: &str = "structview_rpc::ready";

/// A bound, not yet serving, gRPC server.
///
/// Binding is split from serving so callers can learn the actual port when
/// the configured port is `0`.
pub struct GrpcServer {
    listener: TcpListener,
    facade: Arc<ServiceFacade>,
    request_timeout: Duration,
}

impl GrpcServer {
    /// Binds the listener described by `config`.
    pub async fn bind(
        config: &ServerConfig,
        facade: Arc<ServiceFacade>,
    ) -> Result<Self, StructviewError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| StructviewError::Transport {
                message: format!("failed to bind gRPC server to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            listener,
            facade,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, StructviewError> {
        self.listener
            .local_addr()
            .map_err(|e| StructviewError::Transport {
                message: format!("failed to read listener address: {e}"),
                source: Some(Box::new(e)),
            })
    }

    /// Serves until `shutdown` is cancelled. In-flight calls are drained first.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), StructviewError> {
        let port = self.local_addr()?.port();
        let incoming = TcpIncoming::from_listener(self.listener, true, None).map_err(|e| {
            StructviewError::Transport {
                message: format!("failed to prepare gRPC listener: {e}"),
                source: Some(e),
            }
        })?;

        info!(target: READY_TARGET, "listening on :{port}");
        Server::builder()
            .timeout(self.request_timeout)
            .add_service(GrpcService::new(self.facade).into_server())
            .serve_with_incoming_shutdown(incoming, shutdown.cancelled_owned())
            .await
            .map_err(|e| StructviewError::Transport {
                message: format!("gRPC server error: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!("gRPC server stopped");
        Ok(())
    }
}
