// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Stateful adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The extractor is a
//! plain synchronous trait because extraction never blocks.

pub mod adapter;
pub mod extractor;
pub mod storage;

pub use adapter::PluginAdapter;
pub use extractor::FeatureExtractor;
pub use storage::RecordStore;
