// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind hosts, non-zero ports, coherent limits, and compilable
//! custom patterns.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::StructviewConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StructviewConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_host("server.host", &config.server.host, &mut errors);

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "server.request_timeout_secs must be at least 1",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.extraction.max_input_bytes == 0 {
        errors.push(ConfigError::validation(
            "extraction.max_input_bytes must be at least 1",
        ));
    }
    if config.extraction.max_fields == 0 {
        errors.push(ConfigError::validation(
            "extraction.max_fields must be at least 1",
        ));
    }
    if config.extraction.max_field_name_len == 0 {
        errors.push(ConfigError::validation(
            "extraction.max_field_name_len must be at least 1",
        ));
    }

    let mut seen_names = HashSet::new();
    for (i, pattern) in config.extraction.patterns.iter().enumerate() {
        if pattern.name.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "extraction.patterns[{i}].name must not be empty"
            )));
        } else if !seen_names.insert(pattern.name.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate pattern name `{}` in [[extraction.patterns]]",
                pattern.name
            )));
        }
        if let Err(e) = regex::Regex::new(&pattern.pattern) {
            errors.push(ConfigError::validation(format!(
                "extraction.patterns[{i}].pattern does not compile: {e}"
            )));
        }
    }

    if config.history.default_limit == 0 {
        errors.push(ConfigError::validation(
            "history.default_limit must be at least 1",
        ));
    }
    if config.history.default_limit > config.history.max_limit {
        errors.push(ConfigError::validation(format!(
            "history.default_limit ({}) must not exceed history.max_limit ({})",
            config.history.default_limit, config.history.max_limit
        )));
    }

    if config.gateway.enabled {
        validate_host("gateway.host", &config.gateway.host, &mut errors);
        let has_token = config
            .gateway
            .bearer_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_token {
            errors.push(ConfigError::validation(
                "gateway.bearer_token must be set when the gateway is enabled",
            ));
        }
        if config.gateway.port == config.server.port {
            errors.push(ConfigError::validation(format!(
                "gateway.port must differ from server.port ({})",
                config.server.port
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_host(key: &str, host: &str, errors: &mut Vec<ConfigError>) {
    let host = host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation(format!("{key} must not be empty")));
        return;
    }
    let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
    let is_valid_hostname = host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
    if !is_valid_ip && !is_valid_hostname {
        errors.push(ConfigError::validation(format!(
            "{key} `{host}` is not a valid IP address or hostname"
        )));
    }
}
