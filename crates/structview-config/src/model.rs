// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Structview extraction service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Port the gRPC server listens on when nothing else is configured.
pub const DEFAULT_GRPC_PORT: u16 = 50051;

/// Top-level Structview configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StructviewConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// gRPC server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Record storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Feature extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// History listing limits.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Optional HTTP/JSON gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs and health responses.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "structview".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// gRPC server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the gRPC listener to.
    #[serde(default = "default_server_host")]
    pub host: String,

    /// gRPC port. Also settable through `GRPC_PORT`.
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Upper bound on the time a single request may take.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    DEFAULT_GRPC_PORT
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("structview").join("structview.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("structview.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Feature extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Largest input accepted by the extractor, in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    /// Most fields one request may ask for.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,

    /// Longest requested field name, in bytes after trimming.
    #[serde(default = "default_max_field_name_len")]
    pub max_field_name_len: usize,

    /// Number of keywords reported in `top_keywords`.
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Shortest word considered a keyword, in characters.
    #[serde(default = "default_min_keyword_len")]
    pub min_keyword_len: usize,

    /// Additional named regex detectors.
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_fields: default_max_fields(),
            max_field_name_len: default_max_field_name_len(),
            top_keywords: default_top_keywords(),
            min_keyword_len: default_min_keyword_len(),
            patterns: Vec::new(),
        }
    }
}

fn default_max_input_bytes() -> usize {
    1024 * 1024
}

fn default_max_fields() -> usize {
    64
}

fn default_max_field_name_len() -> usize {
    128
}

fn default_top_keywords() -> usize {
    10
}

fn default_min_keyword_len() -> usize {
    3
}

/// A custom detector: every distinct match of `pattern` is reported under `name`.
///
/// When the pattern has a capture group, group 1 is reported instead of the
/// whole match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    /// Feature key the matches are reported under.
    pub name: String,

    /// Regular expression (Rust `regex` syntax).
    pub pattern: String,
}

/// History listing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Page size used when a request does not specify one.
    #[serde(default = "default_history_limit")]
    pub default_limit: u32,

    /// Largest page size a request may ask for.
    #[serde(default = "default_history_max_limit")]
    pub max_limit: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
            max_limit: default_history_max_limit(),
        }
    }
}

fn default_history_limit() -> u32 {
    50
}

fn default_history_max_limit() -> u32 {
    500
}

/// HTTP/JSON gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Enable the gateway.
    #[serde(default)]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on every `/v1` route.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}
