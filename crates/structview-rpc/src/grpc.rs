// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! tonic implementation of the `agent_service.AIService` protocol.

use std::sync::Arc;

use structview_core::{
    ErrorKind, ExtractionRequest, HistoryCursor, HistoryQuery, NewRecord, RecordId,
    StructviewError,
};
use tonic::{Request, Response, Status};

use crate::facade::ServiceFacade;

/// Generated protobuf types and service stubs.
pub mod pb {
    tonic::include_proto!("agent_service");
}

use pb::ai_service_server::{AiService, AiServiceServer};

/// Maps a service error onto the gRPC status vocabulary.
pub fn status_from_error(err: &StructviewError) -> Status {
    let message = err.to_string();
    match err.kind() {
        ErrorKind::InvalidInput | ErrorKind::Invalid => Status::invalid_argument(message),
        ErrorKind::Duplicate => Status::already_exists(message),
        ErrorKind::NotFound => Status::not_found(message),
        ErrorKind::Internal => Status::internal(message),
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl From<pb::FeatureExtractRequest> for ExtractionRequest {
    fn from(req: pb::FeatureExtractRequest) -> Self {
        Self {
            text: req.page_text,
            fields: req.extraction_fields,
            page_url: non_empty(req.page_url),
        }
    }
}

impl From<pb::ExtractedRecord> for NewRecord {
    fn from(rec: pb::ExtractedRecord) -> Self {
        Self {
            id: non_empty(rec.id).map(RecordId),
            page_url: non_empty(rec.page_url),
            source_text: rec.source_text,
            extracted_json: rec.extracted_json,
            created_at: (rec.created_at != 0).then_some(rec.created_at),
        }
    }
}

impl From<structview_core::ExtractedRecord> for pb::ExtractedRecord {
    fn from(rec: structview_core::ExtractedRecord) -> Self {
        Self {
            id: rec.id.0,
            page_url: rec.page_url.unwrap_or_default(),
            source_text: rec.source_text,
            extracted_json: rec.extracted_json,
            created_at: rec.created_at,
        }
    }
}

impl TryFrom<pb::HistoryRequest> for HistoryQuery {
    type Error = StructviewError;

    fn try_from(req: pb::HistoryRequest) -> Result<Self, Self::Error> {
        let cursor = match non_empty(req.cursor) {
            Some(token) => Some(HistoryCursor::decode(&token)?),
            None => None,
        };
        Ok(Self {
            limit: req.limit,
            cursor,
        })
    }
}

/// gRPC front for a [`ServiceFacade`].
#[derive(Clone)]
pub struct GrpcService {
    facade: Arc<ServiceFacade>,
}

impl GrpcService {
    pub fn new(facade: Arc<ServiceFacade>) -> Self {
        Self { facade }
    }

    /// Wraps the service in the generated tonic server type.
    pub fn into_server(self) -> AiServiceServer<Self> {
        AiServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl AiService for GrpcService {
    async fn ping(
        &self,
        request: Request<pb::PingRequest>,
    ) -> Result<Response<pb::PingResponse>, Status> {
        let reply = self.facade.ping(&request.get_ref().message);
        Ok(Response::new(pb::PingResponse { reply }))
    }

    async fn extract_features(
        &self,
        request: Request<pb::FeatureExtractRequest>,
    ) -> Result<Response<pb::FeatureExtractResponse>, Status> {
        let request = ExtractionRequest::from(request.into_inner());
        let reply = Arc::clone(&self.facade)
            .extract_features_blocking(request)
            .await;
        Ok(Response::new(pb::FeatureExtractResponse {
            extracted_json: reply.extracted_json,
            error_message: reply.error_message,
        }))
    }

    async fn save_extracted_record(
        &self,
        request: Request<pb::ExtractedRecord>,
    ) -> Result<Response<pb::SaveRecordResponse>, Status> {
        let record = NewRecord::from(request.into_inner());
        let id = self
            .facade
            .save_extracted_record(record)
            .await
            .map_err(|e| status_from_error(&e))?;
        Ok(Response::new(pb::SaveRecordResponse { id: id.0 }))
    }

    async fn get_extraction_history(
        &self,
        request: Request<pb::HistoryRequest>,
    ) -> Result<Response<pb::ExtractionHistoryResponse>, Status> {
        let query = HistoryQuery::try_from(request.into_inner())
            .map_err(|e| status_from_error(&e))?;
        let page = self
            .facade
            .get_extraction_history(query)
            .await
            .map_err(|e| status_from_error(&e))?;
        Ok(Response::new(pb::ExtractionHistoryResponse {
            next_cursor: page
                .next_cursor
                .map(|c| c.encode())
                .unwrap_or_default(),
            records: page.records.into_iter().map(Into::into).collect(),
        }))
    }
}
