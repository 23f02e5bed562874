// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport-neutral request handling.
//!
//! [`ServiceFacade`] owns the extractor and the record store and exposes one
//! method per RPC. Transports (gRPC, the HTTP gateway) only translate wire
//! types into these calls.

use std::sync::Arc;

use structview_config::model::HistoryConfig;
use structview_core::{
    ErrorKind, ExtractedRecord, ExtractionReply, ExtractionRequest, FeatureExtractor, FeatureSet,
    HealthStatus, HistoryPage, HistoryQuery, NewRecord, RecordId, RecordStore, StructviewError,
};
use tracing::{debug, warn};

/// Fixed reply to `Ping`.
pub const PING_REPLY: &str = "Pong! structview backend is online.";

/// Request handling shared by every transport.
pub struct ServiceFacade {
    extractor: Arc<dyn FeatureExtractor>,
    store: Arc<dyn RecordStore>,
    history: HistoryConfig,
}

impl ServiceFacade {
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        store: Arc<dyn RecordStore>,
        history: HistoryConfig,
    ) -> Self {
        Self {
            extractor,
            store,
            history,
        }
    }

    /// Liveness check. Never fails.
    pub fn ping(&self, message: &str) -> String {
        debug!(inbound = message, "ping received");
        PING_REPLY.to_string()
    }

    /// Runs extraction and packs the outcome into an RPC reply.
    ///
    /// Failures become a placeholder document whose `error` names the kind,
    /// paired with a non-empty `error_message`.
    pub fn extract_features(&self, request: &ExtractionRequest) -> ExtractionReply {
        let outcome = self
            .extractor
            .extract(request)
            .and_then(|set| set.to_document());
        match outcome {
            Ok(extracted_json) => {
                debug!(
                    bytes = request.text.len(),
                    fields = request.fields.len(),
                    extractor = self.extractor.name(),
                    "features extracted"
                );
                ExtractionReply {
                    extracted_json,
                    error_message: String::new(),
                }
            }
            Err(err) => {
                warn!(error = %err, "feature extraction failed");
                failure_reply(err.kind(), err.to_string())
            }
        }
    }

    /// [`Self::extract_features`] on the blocking pool, keeping long scans off
    /// the runtime's worker threads.
    pub async fn extract_features_blocking(
        self: Arc<Self>,
        request: ExtractionRequest,
    ) -> ExtractionReply {
        match tokio::task::spawn_blocking(move || self.extract_features(&request)).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "extraction task failed");
                failure_reply(ErrorKind::Internal, format!("extraction task failed: {err}"))
            }
        }
    }

    /// Persists a record, returning its id.
    pub async fn save_extracted_record(
        &self,
        record: NewRecord,
    ) -> Result<RecordId, StructviewError> {
        let id = self.store.save(record).await.inspect_err(|err| {
            warn!(error = %err, "record save rejected");
        })?;
        debug!(id = %id, "record saved");
        Ok(id)
    }

    /// Lists history after resolving the page size against configured limits.
    pub async fn get_extraction_history(
        &self,
        query: HistoryQuery,
    ) -> Result<HistoryPage, StructviewError> {
        let query = HistoryQuery {
            limit: self.resolve_limit(query.limit),
            cursor: query.cursor,
        };
        let page = self.store.history(&query).await?;
        debug!(
            limit = query.limit,
            returned = page.records.len(),
            more = page.next_cursor.is_some(),
            "history listed"
        );
        Ok(page)
    }

    /// Fetches one stored record.
    pub async fn get_extracted_record(
        &self,
        id: &RecordId,
    ) -> Result<ExtractedRecord, StructviewError> {
        self.store.get(id).await
    }

    /// Store health, used by the HTTP gateway's `/health`.
    pub async fn health(&self) -> HealthStatus {
        match self.store.health_check().await {
            Ok(status) => status,
            Err(err) => HealthStatus::Unhealthy(err.to_string()),
        }
    }

    /// `0` selects the configured default; anything else is capped at the maximum.
    pub fn resolve_limit(&self, requested: u32) -> u32 {
        match requested {
            0 => self.history.default_limit,
            n => n.min(self.history.max_limit),
        }
    }
}

fn failure_reply(kind: ErrorKind, message: String) -> ExtractionReply {
    let extracted_json = FeatureSet::failed(kind)
        .to_document()
        .unwrap_or_else(|_| format!(r#"{{"features":{{}},"fields":{{}},"error":"{kind}"}}"#));
    let error_message = if message.is_empty() {
        kind.to_string()
    } else {
        message
    };
    ExtractionReply {
        extracted_json,
        error_message,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use structview_core::{AdapterType, FeatureValue, HistoryCursor, PluginAdapter};

    use super::*;

    struct CountingExtractor;

    impl FeatureExtractor for CountingExtractor {
        fn name(&self) -> &str {
            "counting"
        }

        fn extract(&self, request: &ExtractionRequest) -> Result<FeatureSet, StructviewError> {
            let text = std::str::from_utf8(&request.text)
                .map_err(|_| StructviewError::InvalidInput("not utf-8".into()))?;
            let mut set = FeatureSet::default();
            if !text.is_empty() {
                set.features.insert(
                    "char_count".into(),
                    FeatureValue::Integer(text.chars().count() as i64),
                );
            }
            Ok(set)
        }
    }

    /// Records the limits it was asked for.
    #[derive(Default)]
    struct SpyStore {
        limits: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PluginAdapter for SpyStore {
        fn name(&self) -> &str {
            "spy"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Storage
        }
        async fn health_check(&self) -> Result<HealthStatus, StructviewError> {
            Err(StructviewError::storage("offline"))
        }
        async fn shutdown(&self) -> Result<(), StructviewError> {
            Ok(())
        }
    }

    #[async_trait]
    impl RecordStore for SpyStore {
        async fn initialize(&self) -> Result<(), StructviewError> {
            Ok(())
        }
        async fn close(&self) -> Result<(), StructviewError> {
            Ok(())
        }
        async fn save(&self, record: NewRecord) -> Result<RecordId, StructviewError> {
            record.validate()?;
            Ok(record.id.unwrap_or_else(|| RecordId::from("generated")))
        }
        async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, StructviewError> {
            self.limits.lock().unwrap().push(query.limit);
            Ok(HistoryPage::default())
        }
        async fn get(&self, id: &RecordId) -> Result<ExtractedRecord, StructviewError> {
            Err(StructviewError::NotFound(id.to_string()))
        }
    }

    fn facade() -> (ServiceFacade, Arc<SpyStore>) {
        let store = Arc::new(SpyStore::default());
        let facade = ServiceFacade::new(
            Arc::new(CountingExtractor),
            store.clone(),
            HistoryConfig {
                default_limit: 50,
                max_limit: 500,
            },
        );
        (facade, store)
    }

    #[test]
    fn ping_always_replies() {
        let (facade, _) = facade();
        assert_eq!(facade.ping("hello"), PING_REPLY);
        assert_eq!(facade.ping(""), PING_REPLY);
    }

    #[test]
    fn extraction_success_has_null_error() {
        let (facade, _) = facade();
        let reply = facade.extract_features(&ExtractionRequest::from_text("abc"));
        assert!(reply.is_success());
        assert_eq!(
            reply.extracted_json,
            r#"{"features":{"char_count":3},"fields":{},"error":null}"#
        );
    }

    #[test]
    fn extraction_failure_is_a_tagged_document() {
        let (facade, _) = facade();
        let reply = facade.extract_features(&ExtractionRequest {
            text: vec![0xc3, 0x28],
            ..ExtractionRequest::default()
        });
        assert!(!reply.is_success());
        assert_eq!(
            reply.extracted_json,
            r#"{"features":{},"fields":{},"error":"invalid_input"}"#
        );
        assert!(reply.error_message.contains("not utf-8"));
        assert!(!reply.extracted_json.contains("Not Implemented"));
    }

    #[tokio::test]
    async fn blocking_extraction_gives_the_same_reply() {
        let (facade, _) = facade();
        let facade = Arc::new(facade);
        let inline = facade.extract_features(&ExtractionRequest::from_text("abcd"));
        let offloaded = Arc::clone(&facade)
            .extract_features_blocking(ExtractionRequest::from_text("abcd"))
            .await;
        assert_eq!(offloaded.extracted_json, inline.extracted_json);
        assert!(offloaded.is_success());
    }

    #[tokio::test]
    async fn history_limits_are_resolved() {
        let (facade, store) = facade();
        for requested in [0, 10, 501, 10_000] {
            facade
                .get_extraction_history(HistoryQuery::first_page(requested))
                .await
                .unwrap();
        }
        assert_eq!(*store.limits.lock().unwrap(), vec![50, 10, 500, 500]);
    }

    #[tokio::test]
    async fn cursor_passes_through() {
        let (facade, _) = facade();
        let cursor = HistoryCursor {
            created_at: 5,
            id: RecordId::from("x"),
        };
        let page = facade
            .get_extraction_history(HistoryQuery {
                limit: 0,
                cursor: Some(cursor),
            })
            .await
            .unwrap();
        assert!(page.records.is_empty());
    }

    #[tokio::test]
    async fn save_errors_propagate() {
        let (facade, _) = facade();
        let err = facade
            .save_extracted_record(NewRecord {
                extracted_json: String::new(),
                ..NewRecord::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn unhealthy_store_reports_unhealthy() {
        let (facade, _) = facade();
        assert!(matches!(facade.health().await, HealthStatus::Unhealthy(_)));
    }
}
