// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction record queries.

use rusqlite::{OptionalExtension, params};
use structview_core::{ExtractedRecord, HistoryCursor, HistoryPage, RecordId, StructviewError};

use crate::database::{Database, map_tr_err};

const RECORD_COLUMNS: &str = "id, page_url, source_text, extracted_json, created_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<ExtractedRecord, rusqlite::Error> {
    Ok(ExtractedRecord {
        id: RecordId(row.get(0)?),
        page_url: row.get(1)?,
        source_text: row.get(2)?,
        extracted_json: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Insert a record unless its id is taken.
///
/// The existence check and the insert share one transaction on the single
/// writer thread, so two concurrent inserts of the same id cannot both
/// succeed. Returns `Duplicate` when the id already exists.
pub async fn insert_record(db: &Database, record: ExtractedRecord) -> Result<(), StructviewError> {
    let id = record.id.0.clone();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM extracted_records WHERE id = ?1",
                    params![record.id.0],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO extracted_records (id, page_url, source_text, extracted_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.0,
                    record.page_url,
                    record.source_text,
                    record.extracted_json,
                    record.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(StructviewError::Duplicate { id })
    }
}

/// Fetch one page of history, newest first, ties broken by id ascending.
///
/// Reads one row past `limit` to learn whether another page follows.
pub async fn list_history(
    db: &Database,
    limit: u32,
    cursor: Option<HistoryCursor>,
) -> Result<HistoryPage, StructviewError> {
    let (after_created, after_id) = match cursor {
        Some(c) => (Some(c.created_at), Some(c.id.0)),
        None => (None, None),
    };
    let fetch = i64::from(limit) + 1;

    let mut records = db
        .connection()
        .call(move |conn| -> Result<Vec<ExtractedRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM extracted_records
                 WHERE ?1 IS NULL OR created_at < ?1 OR (created_at = ?1 AND id > ?2)
                 ORDER BY created_at DESC, id ASC
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![after_created, after_id, fetch], row_to_record)?;
            let records = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)?;

    let has_more = records.len() > limit as usize;
    records.truncate(limit as usize);
    let next_cursor = if has_more {
        records.last().map(HistoryCursor::after)
    } else {
        None
    };
    Ok(HistoryPage {
        records,
        next_cursor,
    })
}

/// Fetch a single record by id.
pub async fn get_record(db: &Database, id: &RecordId) -> Result<ExtractedRecord, StructviewError> {
    let key = id.0.clone();
    let found = db
        .connection()
        .call(move |conn| -> Result<Option<ExtractedRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM extracted_records WHERE id = ?1"),
                params![key],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    found.ok_or_else(|| StructviewError::NotFound(format!("record `{id}`")))
}
