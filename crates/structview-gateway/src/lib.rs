// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/JSON gateway for the Structview extraction service.
//!
//! Mirrors the gRPC operations as JSON routes for clients that cannot speak
//! gRPC. Every `/v1` route requires the configured bearer token; `/health`
//! is public.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use handlers::GatewayState;
pub use server::{GatewayServer, router};
