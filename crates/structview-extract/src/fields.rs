// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requested-field lookup.
//!
//! A requested field `Price` is found in text such as `Price: $12`,
//! `price = 12` or `PRICE - 12`. The name must start a line or follow
//! whitespace; the value runs to the end of the line.

use std::collections::BTreeMap;

use regex::RegexBuilder;
use structview_core::StructviewError;

/// Normalizes a requested field name into its document key.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `_`, and trims leading and trailing `_`. Returns `None` for names
/// with no alphanumeric content.
pub fn field_key(name: &str) -> Option<String> {
    let mut key = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.is_empty() && !key.ends_with('_') {
            key.push('_');
        }
    }
    while key.ends_with('_') {
        key.pop();
    }
    (!key.is_empty()).then_some(key)
}

/// Looks up every requested field in `text`.
///
/// Blank names are skipped. When two names normalize to the same key the
/// first one wins.
pub fn extract_fields(
    text: &str,
    names: &[String],
) -> Result<BTreeMap<String, Option<String>>, StructviewError> {
    let mut fields = BTreeMap::new();
    for name in names {
        let name = name.trim();
        let Some(key) = field_key(name) else {
            continue;
        };
        if fields.contains_key(&key) {
            continue;
        }
        let value = find_value(text, name)?;
        fields.insert(key, value);
    }
    Ok(fields)
}

fn find_value(text: &str, name: &str) -> Result<Option<String>, StructviewError> {
    let pattern = format!(
        r"(?:^|[ \t]){}[ \t]*(?:[:=]|[ \t]-)[ \t]*([^\r\n]*\S)",
        regex::escape(name)
    );
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .map_err(|e| StructviewError::InvalidInput(format!("field name `{name}` is unusable: {e}")))?;

    Ok(regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string()))
}
