// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Structview extraction service.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Coarse error classification surfaced to RPC callers.
///
/// Every [`StructviewError`] maps onto exactly one kind; transports translate
/// kinds into their own status vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Extraction input could not be processed (bad encoding, too large).
    InvalidInput,
    /// A record submitted for saving is malformed.
    Invalid,
    /// A caller-supplied record id already exists.
    Duplicate,
    /// A lookup found nothing.
    NotFound,
    /// Unexpected failure (storage unavailable, transport fault).
    Internal,
}

/// The primary error type used across the extractor, the record store, and the facade.
#[derive(Debug, Error)]
pub enum StructviewError {
    /// Extraction input was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A record failed validation on save, or a query argument was malformed.
    #[error("invalid record: {0}")]
    Invalid(String),

    /// A record with the same id is already stored.
    #[error("record `{id}` already exists")]
    Duplicate { id: String },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors discovered after startup validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (bind failure, serve loop failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StructviewError {
    /// Returns the caller-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage { .. } | Self::Config(_) | Self::Transport { .. } | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}
