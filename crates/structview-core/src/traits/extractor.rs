// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature extractor trait.

use crate::error::StructviewError;
use crate::types::{ExtractionRequest, FeatureSet};

/// Turns raw page text into a [`FeatureSet`].
///
/// Implementations must be deterministic and free of side effects: the same
/// request always yields the same set, and concurrent calls share no mutable
/// state. Empty input yields an empty set. Malformed input yields
/// [`StructviewError::InvalidInput`], never a panic.
pub trait FeatureExtractor: Send + Sync + 'static {
    /// Returns the human-readable name of this extractor.
    fn name(&self) -> &str;

    /// Extracts features from `request`.
    fn extract(&self, request: &ExtractionRequest) -> Result<FeatureSet, StructviewError>;
}
