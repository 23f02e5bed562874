// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Structview extraction service.
//!
//! This crate provides the trait definitions, error taxonomy, and record types
//! shared by the extractor, the record store, and the RPC transports.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, StructviewError};
pub use types::{
    AdapterType, ExtractedRecord, ExtractionReply, ExtractionRequest, FeatureSet, FeatureValue,
    HealthStatus, HistoryCursor, HistoryPage, HistoryQuery, NewRecord, RecordId,
};

pub use traits::{FeatureExtractor, PluginAdapter, RecordStore};
