// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway API.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use structview_core::{
    ErrorKind, ExtractedRecord, ExtractionReply, ExtractionRequest, HealthStatus, HistoryCursor,
    HistoryQuery, NewRecord, RecordId, StructviewError,
};
use structview_rpc::ServiceFacade;

use crate::auth::AuthConfig;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub facade: Arc<ServiceFacade>,
    pub auth: AuthConfig,
}

/// Request body for POST /v1/ping.
#[derive(Debug, Default, Deserialize)]
pub struct PingRequest {
    #[serde(default)]
    pub message: String,
}

/// Response body for POST /v1/ping.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub reply: String,
}

/// Request body for POST /v1/extract.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub page_url: Option<String>,
    pub page_text: String,
    #[serde(default)]
    pub extraction_fields: Vec<String>,
}

/// Response body for POST /v1/records.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub id: RecordId,
}

/// Query string for GET /v1/records.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Response body for GET /v1/records.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<ExtractedRecord>,
    pub next_cursor: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub version: &'static str,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
    /// Machine-readable classification.
    pub kind: ErrorKind,
}

/// A [`StructviewError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub StructviewError);

impl From<StructviewError> for ApiError {
    fn from(err: StructviewError) -> Self {
        Self(err)
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Duplicate => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "gateway request failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

/// GET /health
///
/// Public. Reports store health; 503 when the store is unhealthy.
pub async fn get_public_health(State(state): State<GatewayState>) -> Response {
    let (status, label, detail) = match state.facade.health().await {
        HealthStatus::Healthy => (StatusCode::OK, "healthy", None),
        HealthStatus::Degraded(why) => (StatusCode::OK, "degraded", Some(why)),
        HealthStatus::Unhealthy(why) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(why)),
    };
    let body = HealthResponse {
        status: label,
        detail,
        version: env!("CARGO_PKG_VERSION"),
    };
    (status, Json(body)).into_response()
}

/// POST /v1/ping
pub async fn post_ping(
    State(state): State<GatewayState>,
    Json(body): Json<PingRequest>,
) -> Json<PingResponse> {
    Json(PingResponse {
        reply: state.facade.ping(&body.message),
    })
}

/// POST /v1/extract
///
/// Extraction failures are reported in the body, as over gRPC.
pub async fn post_extract(
    State(state): State<GatewayState>,
    Json(body): Json<ExtractRequest>,
) -> Json<ExtractionReply> {
    let request = ExtractionRequest {
        text: body.page_text.into_bytes(),
        fields: body.extraction_fields,
        page_url: body.page_url.filter(|url| !url.is_empty()),
    };
    Json(state.facade.extract_features_blocking(request).await)
}

/// POST /v1/records
pub async fn post_records(
    State(state): State<GatewayState>,
    Json(record): Json<NewRecord>,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    let id = state.facade.save_extracted_record(record).await?;
    Ok((StatusCode::CREATED, Json(SaveResponse { id })))
}

/// GET /v1/records?limit=&cursor=
pub async fn get_records(
    State(state): State<GatewayState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let cursor = match params.cursor.as_deref().filter(|c| !c.is_empty()) {
        Some(token) => Some(HistoryCursor::decode(token)?),
        None => None,
    };
    let page = state
        .facade
        .get_extraction_history(HistoryQuery {
            limit: params.limit.unwrap_or(0),
            cursor,
        })
        .await?;
    Ok(Json(HistoryResponse {
        records: page.records,
        next_cursor: page.next_cursor.map(|c| c.encode()),
    }))
}

/// GET /v1/records/{id}
pub async fn get_record(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ExtractedRecord>, ApiError> {
    let record = state.facade.get_extracted_record(&RecordId(id)).await?;
    Ok(Json(record))
}
