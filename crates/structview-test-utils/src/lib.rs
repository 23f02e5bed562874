// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Structview integration tests.
//!
//! Provides a temp-directory service stack and mock adapters for fast,
//! deterministic tests without a fixed port or a shared database.
//!
//! # Components
//!
//! - [`TestHarness`] - extractor, SQLite store and facade over a temp database
//! - [`FailingStore`] - record store whose every call fails with a storage error

pub mod harness;
pub mod mock_store;

pub use harness::{RunningServer, TestHarness};
pub use mock_store::FailingStore;
