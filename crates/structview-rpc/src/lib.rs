// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC surface of the Structview extraction service.
//!
//! [`ServiceFacade`] holds the request semantics; [`GrpcService`] and
//! [`GrpcServer`] expose it as the `agent_service.AIService` gRPC protocol.

pub mod facade;
pub mod grpc;
pub mod server;

pub use facade::{PING_REPLY, ServiceFacade};
pub use grpc::{GrpcService, pb, status_from_error};
pub use server::{GrpcServer, READY_TARGET};
