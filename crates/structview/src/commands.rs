// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `extract`, `history` and `config`.

use std::io::{Read, Write};
use std::path::Path;

use structview_config::StructviewConfig;
use structview_core::{
    ExtractionRequest, FeatureExtractor, HistoryCursor, HistoryQuery, RecordStore,
    StructviewError,
};
use structview_extract::RegexExtractor;
use structview_storage::SqliteStorage;

fn io_error(context: &str, e: std::io::Error) -> StructviewError {
    StructviewError::Internal(format!("{context}: {e}"))
}

/// Runs the extractor once over a file (or stdin) and prints the document.
pub fn run_extract(
    config: &StructviewConfig,
    file: Option<&Path>,
    fields: Vec<String>,
    page_url: Option<String>,
) -> Result<(), StructviewError> {
    let text = match file {
        Some(path) => std::fs::read(path)
            .map_err(|e| io_error(&format!("failed to read {}", path.display()), e))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| io_error("failed to read stdin", e))?;
            buf
        }
    };

    let extractor = RegexExtractor::new(&config.extraction)?;
    let set = extractor.extract(&ExtractionRequest {
        text,
        fields,
        page_url,
    })?;
    println!("{}", set.to_document()?);
    Ok(())
}

/// Prints one page of stored history as JSON lines.
///
/// The cursor for the next page, if any, goes to stderr.
pub async fn run_history(
    config: &StructviewConfig,
    limit: u32,
    cursor: Option<&str>,
) -> Result<(), StructviewError> {
    let cursor = cursor.map(HistoryCursor::decode).transpose()?;
    let limit = match limit {
        0 => config.history.default_limit,
        n => n.min(config.history.max_limit),
    };

    let store = SqliteStorage::new(config.storage.clone());
    store.initialize().await?;
    let page = store.history(&HistoryQuery { limit, cursor }).await?;
    store.close().await?;

    let mut out = std::io::stdout().lock();
    for record in &page.records {
        let line = serde_json::to_string(record)
            .map_err(|e| StructviewError::Internal(format!("failed to encode record: {e}")))?;
        writeln!(out, "{line}").map_err(|e| io_error("failed to write stdout", e))?;
    }
    if let Some(next) = page.next_cursor {
        eprintln!("next cursor: {}", next.encode());
    }
    Ok(())
}

/// Renders the effective configuration as TOML, secrets redacted.
pub fn render_config(config: &StructviewConfig) -> Result<String, StructviewError> {
    let mut shown = config.clone();
    if shown.gateway.bearer_token.is_some() {
        shown.gateway.bearer_token = Some("[redacted]".to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| StructviewError::Config(format!("failed to render configuration: {e}")))
}
