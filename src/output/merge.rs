//! Combine shard outputs into single tables

use super::tables::{read_snapshot, read_zero_yield, write_snapshot, write_zero_yield};
use super::{OutputPaths, CODES_STEM, NOCODES_STEM};
use crate::domain::{HarvestError, NormalizedCodeRow, Result, RowKey, ZeroYieldRecord};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// What a merge read and wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub code_files: usize,
    pub nocode_files: usize,
    pub code_rows: usize,
    pub nocode_rows: usize,
    pub duplicate_rows: usize,
}

/// CSV files in `dir` whose name starts with `stem`, sorted by name
fn table_files(dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| HarvestError::Io(format!("Failed to read {}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some("csv")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with(stem))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Merge every shard table under `input` into unsuffixed tables in `output`
///
/// Code rows are deduplicated by key (first occurrence wins) and sorted.
/// Zero-yield entries are deduplicated by document and dropped for documents
/// that have rows in the merged snapshot.
pub fn merge_shard_outputs(input: &Path, output: &Path) -> Result<MergeReport> {
    let code_files = table_files(input, CODES_STEM)?;
    let nocode_files = table_files(input, NOCODES_STEM)?;

    if code_files.is_empty() && nocode_files.is_empty() {
        return Err(HarvestError::Output(format!(
            "No shard tables found in {}",
            input.display()
        )));
    }

    let mut report = MergeReport {
        code_files: code_files.len(),
        nocode_files: nocode_files.len(),
        ..Default::default()
    };

    let mut codes: BTreeMap<RowKey, NormalizedCodeRow> = BTreeMap::new();
    for path in &code_files {
        for row in read_snapshot(path)? {
            let key = row.key();
            if codes.contains_key(&key) {
                report.duplicate_rows += 1;
            } else {
                codes.insert(key, row);
            }
        }
    }

    let with_rows: HashSet<(String, String)> = codes
        .keys()
        .map(|k| (k.doc_family.clone(), k.doc_id.clone()))
        .collect();

    let mut nocodes: BTreeMap<(String, String), ZeroYieldRecord> = BTreeMap::new();
    for path in &nocode_files {
        for record in read_zero_yield(path)? {
            let key = (record.doc_family.clone(), record.doc_id.clone());
            if !with_rows.contains(&key) {
                nocodes.entry(key).or_insert(record);
            }
        }
    }

    let codes: Vec<NormalizedCodeRow> = codes.into_values().collect();
    let nocodes: Vec<ZeroYieldRecord> = nocodes.into_values().collect();
    report.code_rows = codes.len();
    report.nocode_rows = nocodes.len();

    let paths = OutputPaths::unsharded(output);
    write_snapshot(&paths.codes(), &codes)?;
    write_zero_yield(&paths.nocodes(), &nocodes)?;

    tracing::info!(
        code_files = report.code_files,
        nocode_files = report.nocode_files,
        code_rows = report.code_rows,
        nocode_rows = report.nocode_rows,
        duplicate_rows = report.duplicate_rows,
        "Merged shard outputs"
    );
    Ok(report)
}
