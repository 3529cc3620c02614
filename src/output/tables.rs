//! CSV writers and readers for the output tables

use crate::domain::{ChangeRecord, HarvestError, NormalizedCodeRow, Result, ZeroYieldRecord};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;
use std::path::Path;

pub const CODES_HEADER: [&str; 6] = [
    "doc_family",
    "doc_id",
    "code_system",
    "code",
    "description",
    "coverage_flag",
];

pub const NOCODES_HEADER: [&str; 4] = ["doc_family", "doc_id", "display_id", "reason"];

pub const CHANGES_HEADER: [&str; 7] = [
    "change_type",
    "doc_family",
    "doc_id",
    "code_system",
    "code",
    "prev_flag",
    "curr_flag",
];

// Accepted column names when reading, current name first
const DOC_FAMILY_COLUMNS: &[&str] = &["doc_family", "doc_type", "document_type"];
const DOC_ID_COLUMNS: &[&str] = &["doc_id", "document_id", "article_id"];
const CODE_SYSTEM_COLUMNS: &[&str] = &["code_system"];
const CODE_COLUMNS: &[&str] = &["code"];
const DESCRIPTION_COLUMNS: &[&str] = &["description"];
const FLAG_COLUMNS: &[&str] = &["coverage_flag"];
const DISPLAY_ID_COLUMNS: &[&str] = &["display_id", "document_display_id"];
const REASON_COLUMNS: &[&str] = &["reason"];

fn write_table<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(())
}

/// Write the snapshot table
pub fn write_snapshot(path: &Path, rows: &[NormalizedCodeRow]) -> Result<()> {
    write_table(path, &CODES_HEADER, rows)
}

/// Write the zero-yield table
pub fn write_zero_yield(path: &Path, records: &[ZeroYieldRecord]) -> Result<()> {
    write_table(path, &NOCODES_HEADER, records)
}

/// Write the change log
pub fn write_changes(path: &Path, changes: &[ChangeRecord]) -> Result<()> {
    write_table(path, &CHANGES_HEADER, changes)
}

/// Header positions resolved through the accepted column names
struct Columns<'a> {
    headers: &'a StringRecord,
}

impl<'a> Columns<'a> {
    fn find(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| {
            self.headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        })
    }

    fn require(&self, names: &[&str], path: &Path) -> Result<usize> {
        self.find(names).ok_or_else(|| {
            HarvestError::Output(format!(
                "{} has no '{}' column",
                path.display(),
                names.first().copied().unwrap_or_default()
            ))
        })
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| HarvestError::Output(format!("Failed to open {}: {}", path.display(), e)))
}

/// Read a snapshot table
///
/// Accepts the legacy column names, trims values, and drops rows without a
/// document id or code. An empty file reads as an empty snapshot.
pub fn read_snapshot(path: &Path) -> Result<Vec<NormalizedCodeRow>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let columns = Columns { headers: &headers };
    let doc_id = Some(columns.require(DOC_ID_COLUMNS, path)?);
    let code = Some(columns.require(CODE_COLUMNS, path)?);
    let doc_family = columns.find(DOC_FAMILY_COLUMNS);
    let code_system = columns.find(CODE_SYSTEM_COLUMNS);
    let description = columns.find(DESCRIPTION_COLUMNS);
    let flag = columns.find(FLAG_COLUMNS);

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let row = NormalizedCodeRow {
            doc_family: field(&record, doc_family),
            doc_id: field(&record, doc_id),
            code_system: field(&record, code_system),
            code: field(&record, code),
            description: field(&record, description),
            coverage_flag: field(&record, flag),
        };
        if row.doc_id.is_empty() || row.code.is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        dropped = dropped,
        "Read snapshot"
    );
    Ok(rows)
}

/// Read a baseline snapshot that may not exist
///
/// Returns `None` for a missing or zero-byte file. A header-only file is a
/// baseline with no rows.
pub fn read_snapshot_if_present(path: &Path) -> Result<Option<Vec<NormalizedCodeRow>>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Previous snapshot not found");
        return Ok(None);
    }
    if std::fs::metadata(path)?.len() == 0 {
        tracing::warn!(path = %path.display(), "Previous snapshot is empty");
        return Ok(None);
    }
    read_snapshot(path).map(Some)
}

/// Read a zero-yield table
pub fn read_zero_yield(path: &Path) -> Result<Vec<ZeroYieldRecord>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let columns = Columns { headers: &headers };
    let doc_id = Some(columns.require(DOC_ID_COLUMNS, path)?);
    let doc_family = columns.find(DOC_FAMILY_COLUMNS);
    let display_id = columns.find(DISPLAY_ID_COLUMNS);
    let reason = columns.find(REASON_COLUMNS);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let entry = ZeroYieldRecord {
            doc_family: field(&record, doc_family),
            doc_id: field(&record, doc_id),
            display_id: field(&record, display_id),
            reason: field(&record, reason),
        };
        if !entry.doc_id.is_empty() {
            records.push(entry);
        }
    }
    Ok(records)
}
