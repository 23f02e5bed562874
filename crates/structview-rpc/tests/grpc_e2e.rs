// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over a loopback gRPC connection.

use std::sync::Arc;

use structview_rpc::PING_REPLY;
use structview_rpc::pb::ai_service_client::AiServiceClient;
use structview_rpc::pb::{
    ExtractedRecord, FeatureExtractRequest, HistoryRequest, PingRequest,
};
use structview_test_utils::{FailingStore, RunningServer, TestHarness};
use tonic::Code;
use tonic::transport::Channel;

async fn connect(server: &RunningServer) -> AiServiceClient<Channel> {
    AiServiceClient::connect(server.endpoint()).await.unwrap()
}

fn record(id: &str, created_at: i64, json: &str) -> ExtractedRecord {
    ExtractedRecord {
        id: id.to_string(),
        page_url: format!("https://shop.example/{id}"),
        source_text: format!("text of {id}"),
        extracted_json: json.to_string(),
        created_at,
    }
}

#[tokio::test]
async fn ping_replies_with_fixed_text() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    for message in ["hello", ""] {
        let reply = client
            .ping(PingRequest {
                message: message.to_string(),
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(reply.reply, PING_REPLY);
    }
    server.stop().await.unwrap();
}

#[tokio::test]
async fn extract_features_returns_a_document() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    let reply = client
        .extract_features(FeatureExtractRequest {
            page_url: "https://shop.example/item".into(),
            page_text: b"Price: $19.99\nContact sales@shop.example today.".to_vec(),
            extraction_fields: vec!["price".into(), "color".into()],
        })
        .await
        .unwrap()
        .into_inner();

    assert!(reply.error_message.is_empty());
    let doc: serde_json::Value = serde_json::from_str(&reply.extracted_json).unwrap();
    assert!(doc["error"].is_null());
    assert_eq!(doc["features"]["emails"][0], "sales@shop.example");
    assert_eq!(doc["features"]["page_host"], "shop.example");
    assert_eq!(doc["fields"]["price"], "$19.99");
    assert!(doc["fields"]["color"].is_null());
    assert!(!reply.extracted_json.contains("Not Implemented"));
    server.stop().await.unwrap();
}

#[tokio::test]
async fn invalid_utf8_is_reported_in_band() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    let reply = client
        .extract_features(FeatureExtractRequest {
            page_text: vec![b'o', b'k', 0xff, 0xfe],
            ..FeatureExtractRequest::default()
        })
        .await
        .unwrap()
        .into_inner();

    assert!(!reply.error_message.is_empty());
    let doc: serde_json::Value = serde_json::from_str(&reply.extracted_json).unwrap();
    assert_eq!(doc["error"], "invalid_input");
    server.stop().await.unwrap();
}

#[tokio::test]
async fn too_many_fields_is_reported_in_band() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    let reply = client
        .extract_features(FeatureExtractRequest {
            page_text: b"Price: 12".to_vec(),
            extraction_fields: (0..65).map(|i| format!("field{i}")).collect(),
            ..FeatureExtractRequest::default()
        })
        .await
        .unwrap()
        .into_inner();

    assert!(reply.error_message.contains("limit is 64"));
    let doc: serde_json::Value = serde_json::from_str(&reply.extracted_json).unwrap();
    assert_eq!(doc["error"], "invalid_input");
    server.stop().await.unwrap();
}

#[tokio::test]
async fn saved_records_come_back_through_history() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    let json = r#"{"features": {"prices": ["$5"]},  "fields": {}}"#;
    let saved = client
        .save_extracted_record(record("", 0, json))
        .await
        .unwrap()
        .into_inner();
    assert!(!saved.id.is_empty());

    let history = client
        .get_extraction_history(HistoryRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(history.records.len(), 1);
    assert_eq!(history.records[0].id, saved.id);
    assert_eq!(history.records[0].extracted_json, json);
    assert!(history.records[0].created_at > 0);
    assert!(history.next_cursor.is_empty());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn history_pages_follow_the_cursor() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    for (id, at) in [("a", 10), ("b", 30), ("c", 20), ("d", 20)] {
        client
            .save_extracted_record(record(id, at, "{}"))
            .await
            .unwrap();
    }

    let first = client
        .get_extraction_history(HistoryRequest {
            limit: 2,
            cursor: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    let ids: Vec<_> = first.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["b", "c"]);
    assert!(!first.next_cursor.is_empty());

    let second = client
        .get_extraction_history(HistoryRequest {
            limit: 2,
            cursor: first.next_cursor,
        })
        .await
        .unwrap()
        .into_inner();
    let ids: Vec<_> = second.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["d", "a"]);
    assert!(second.next_cursor.is_empty());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn duplicate_id_is_already_exists() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    client
        .save_extracted_record(record("fixed", 1, "{}"))
        .await
        .unwrap();
    let status = client
        .save_extracted_record(record("fixed", 2, r#"{"x":1}"#))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn malformed_records_are_invalid_argument() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    for bad in [
        record("", 0, "not json"),
        record("", 0, ""),
        record("", -5, "{}"),
    ] {
        let status = client.save_extracted_record(bad).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    let history = client
        .get_extraction_history(HistoryRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert!(history.records.is_empty());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn bad_cursor_is_invalid_argument() {
    let harness = TestHarness::new().await.unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    let status = client
        .get_extraction_history(HistoryRequest {
            limit: 10,
            cursor: "not-a-cursor!".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn storage_outage_is_internal() {
    let store = Arc::new(FailingStore::new());
    let harness = TestHarness::builder()
        .with_store(store.clone())
        .build()
        .await
        .unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    let status = client
        .save_extracted_record(record("", 0, "{}"))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    let status = client
        .get_extraction_history(HistoryRequest::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(store.calls(), 2);

    // Ping and extraction do not touch storage.
    assert!(client.ping(PingRequest::default()).await.is_ok());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn history_limit_is_capped() {
    let harness = TestHarness::builder()
        .with_history_limits(2, 3)
        .build()
        .await
        .unwrap();
    let server = harness.spawn_grpc().await.unwrap();
    let mut client = connect(&server).await;

    for i in 0..5 {
        client
            .save_extracted_record(record(&format!("r{i}"), i + 1, "{}"))
            .await
            .unwrap();
    }

    let default_page = client
        .get_extraction_history(HistoryRequest::default())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(default_page.records.len(), 2);

    let capped = client
        .get_extraction_history(HistoryRequest {
            limit: 1_000,
            cursor: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(capped.records.len(), 3);
    server.stop().await.unwrap();
}
