// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::net::SocketAddr;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use structview_config::model::GatewayConfig;
use structview_core::StructviewError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::handlers::{self, GatewayState};

/// Builds the gateway router.
///
/// - GET /health (public)
/// - POST /v1/ping, POST /v1/extract (with auth)
/// - POST /v1/records, GET /v1/records, GET /v1/records/{id} (with auth)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/ping", post(handlers::post_ping))
        .route("/v1/extract", post(handlers::post_extract))
        .route(
            "/v1/records",
            post(handlers::post_records).get(handlers::get_records),
        )
        .route("/v1/records/{id}", get(handlers::get_record))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// A bound gateway listener.
pub struct GatewayServer {
    listener: TcpListener,
    app: Router,
}

impl GatewayServer {
    pub async fn bind(
        config: &GatewayConfig,
        state: GatewayState,
    ) -> Result<Self, StructviewError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| StructviewError::Transport {
                message: format!("failed to bind gateway to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            listener,
            app: router(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, StructviewError> {
        self.listener
            .local_addr()
            .map_err(|e| StructviewError::Transport {
                message: format!("failed to read gateway address: {e}"),
                source: Some(Box::new(e)),
            })
    }

    /// Serves until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), StructviewError> {
        let addr = self.local_addr()?;
        tracing::info!("gateway listening on {addr}");

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(|e| StructviewError::Transport {
                message: format!("gateway server error: {e}"),
                source: Some(Box::new(e)),
            })?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}
