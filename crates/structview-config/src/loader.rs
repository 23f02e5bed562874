// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./structview.toml` > `~/.config/structview/structview.toml`
//! > `/etc/structview/structview.toml`, the `GRPC_PORT` port variable, and
//! environment variable overrides via the `STRUCTVIEW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StructviewConfig;

/// Environment variable carrying the gRPC port.
///
/// Unset or empty falls back to the configured port without complaint.
pub const PORT_ENV: &str = "GRPC_PORT";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/structview/structview.toml` (system-wide)
/// 3. `~/.config/structview/structview.toml` (user XDG config)
/// 4. `./structview.toml` (local directory)
/// 5. `GRPC_PORT`
/// 6. `STRUCTVIEW_*` environment variables
pub fn load_config() -> Result<StructviewConfig, figment::Error> {
    build_figment()?.extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StructviewConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StructviewConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StructviewConfig, figment::Error> {
    let figment = Figment::new()
        .merge(Serialized::defaults(StructviewConfig::default()))
        .merge(Toml::file(path));
    with_env_overrides(figment)?.extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Result<Figment, figment::Error> {
    let figment = Figment::new()
        .merge(Serialized::defaults(StructviewConfig::default()))
        .merge(Toml::file("/etc/structview/structview.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("structview/structview.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("structview.toml"));
    with_env_overrides(figment)
}

fn with_env_overrides(figment: Figment) -> Result<Figment, figment::Error> {
    let figment = match port_from_env()? {
        Some(port) => {
            tracing::debug!(port, "{PORT_ENV} overrides server.port");
            figment.merge(Serialized::default("server.port", port))
        }
        None => figment,
    };
    Ok(figment.merge(env_provider()))
}

/// Reads `GRPC_PORT`. Unset or blank yields `None`; anything else must be a port number.
fn port_from_env() -> Result<Option<u16>, figment::Error> {
    let Ok(raw) = std::env::var(PORT_ENV) else {
        return Ok(None);
    };
    parse_port(&raw)
}

fn parse_port(raw: &str) -> Result<Option<u16>, figment::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|_| figment::Error::from(format!("{PORT_ENV} must be a port number, got `{raw}`")))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `STRUCTVIEW_STORAGE_DATABASE_PATH`
/// must map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("STRUCTVIEW_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: STRUCTVIEW_SERVER_PORT -> "server_port"
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = ["service", "server", "storage", "extraction", "history", "gateway"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key_str);
        mapped.into()
    })
}
