// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature extraction for the Structview service.
//!
//! [`RegexExtractor`] turns page text into a [`FeatureSet`](structview_core::FeatureSet):
//! text statistics, regex-detected entities (e-mails, URLs, prices, dates and
//! more), ranked keywords, configured custom patterns, and caller-requested
//! `Name: value` fields. Extraction is pure and deterministic.

pub mod detectors;
pub mod engine;
pub mod fields;
pub mod keywords;

pub use engine::{BUILTIN_FEATURES, RegexExtractor};
