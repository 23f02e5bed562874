// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the extractor, the record store, and the transports.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ErrorKind, StructviewError};

/// Upper bound on the byte length of a caller-supplied record id.
pub const MAX_RECORD_ID_LEN: usize = 128;

/// Unique identifier for a stored extraction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A persisted unit pairing the original input with its extracted document.
///
/// Records are immutable once stored. `extracted_json` is kept byte-for-byte
/// as it was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub id: RecordId,
    pub page_url: Option<String>,
    pub source_text: String,
    pub extracted_json: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// A record submitted for saving.
///
/// `id` and `created_at` are optional; the store fills them in when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub source_text: String,
    pub extracted_json: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl NewRecord {
    /// Checks the record invariants that hold for every stored record.
    ///
    /// A supplied id must be non-blank, carry no surrounding whitespace and
    /// fit in [`MAX_RECORD_ID_LEN`] bytes; `extracted_json` must parse as JSON;
    /// `created_at` must not be negative.
    pub fn validate(&self) -> Result<(), StructviewError> {
        if let Some(id) = &self.id {
            let raw = id.as_str();
            if raw.trim().is_empty() {
                return Err(StructviewError::Invalid("record id must not be blank".into()));
            }
            if raw.trim() != raw {
                return Err(StructviewError::Invalid(format!(
                    "record id `{raw}` has surrounding whitespace"
                )));
            }
            if raw.len() > MAX_RECORD_ID_LEN {
                return Err(StructviewError::Invalid(format!(
                    "record id exceeds {MAX_RECORD_ID_LEN} bytes"
                )));
            }
        }

        if self.extracted_json.trim().is_empty() {
            return Err(StructviewError::Invalid("extracted_json must not be empty".into()));
        }
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&self.extracted_json) {
            return Err(StructviewError::Invalid(format!(
                "extracted_json is not valid JSON: {e}"
            )));
        }

        if let Some(created_at) = self.created_at.filter(|t| *t < 0) {
            return Err(StructviewError::Invalid(format!(
                "created_at must be non-negative, got {created_at}"
            )));
        }

        Ok(())
    }
}

/// A single extracted feature value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

/// The output of feature extraction.
///
/// Ordered maps keep the serialized document identical across runs for the
/// same input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Features produced by the built-in and configured detectors.
    pub features: BTreeMap<String, FeatureValue>,
    /// Caller-requested fields; `None` when the field was not found in the text.
    pub fields: BTreeMap<String, Option<String>>,
    /// Set only on failure documents.
    pub error: Option<ErrorKind>,
}

impl FeatureSet {
    /// An empty feature set carrying an error indicator.
    pub fn failed(kind: ErrorKind) -> Self {
        Self {
            error: Some(kind),
            ..Self::default()
        }
    }

    /// True when no feature or field was produced.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.fields.is_empty()
    }

    /// Serializes the set into the wire document carried by `extracted_json`.
    pub fn to_document(&self) -> Result<String, StructviewError> {
        serde_json::to_string(self)
            .map_err(|e| StructviewError::Internal(format!("failed to encode feature set: {e}")))
    }
}

/// Input to the feature extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Raw page text. Kept as bytes so encoding problems surface as
    /// `InvalidInput` instead of failing earlier in the transport.
    pub text: Vec<u8>,
    /// Field names the caller wants pulled out of the text.
    pub fields: Vec<String>,
    /// URL of the page the text came from, if known.
    pub page_url: Option<String>,
}

impl ExtractionRequest {
    /// A request with text only.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into().into_bytes(),
            ..Self::default()
        }
    }
}

/// Result of an `ExtractFeatures` call as seen by RPC callers.
///
/// Exactly one side is meaningful: success has an empty `error_message`,
/// failure has a non-empty one and a placeholder document whose `error`
/// field names the failure kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReply {
    pub extracted_json: String,
    pub error_message: String,
}

impl ExtractionReply {
    pub fn is_success(&self) -> bool {
        self.error_message.is_empty()
    }
}

/// Position in the history listing, handed back to callers as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCursor {
    pub created_at: i64,
    pub id: RecordId,
}

impl HistoryCursor {
    /// The cursor pointing just past `record`.
    pub fn after(record: &ExtractedRecord) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id.clone(),
        }
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", self.created_at, self.id))
    }

    /// Decodes a cursor previously produced by [`HistoryCursor::encode`].
    pub fn decode(token: &str) -> Result<Self, StructviewError> {
        let invalid = || StructviewError::Invalid(format!("malformed history cursor `{token}`"));
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (created_at, id) = text.split_once(':').ok_or_else(invalid)?;
        let created_at = created_at.parse::<i64>().map_err(|_| invalid())?;
        if id.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            created_at,
            id: RecordId(id.to_string()),
        })
    }
}

/// A history listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Maximum records to return. `0` means "use the configured default".
    pub limit: u32,
    pub cursor: Option<HistoryCursor>,
}

impl HistoryQuery {
    pub fn first_page(limit: u32) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }
}

/// One page of history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    pub records: Vec<ExtractedRecord>,
    /// Present when more records follow this page.
    pub next_cursor: Option<HistoryCursor>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
}
