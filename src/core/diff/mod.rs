//! Change detection between two snapshots
//!
//! Rows are keyed by `(doc_family, doc_id, code_system, code)` and compared
//! by coverage flag only. Output is sorted by key.

use crate::domain::{ChangeRecord, ChangeType, DocumentRef, NormalizedCodeRow, RowKey};
use std::collections::{BTreeMap, HashSet};

/// Counts per change type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub flag_changed: usize,
}

impl ChangeSummary {
    pub fn from_changes(changes: &[ChangeRecord]) -> Self {
        changes.iter().fold(Self::default(), |mut acc, change| {
            match change.change_type {
                ChangeType::Added => acc.added += 1,
                ChangeType::Removed => acc.removed += 1,
                ChangeType::FlagChanged => acc.flag_changed += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.flag_changed
    }
}

fn flag_map(rows: &[NormalizedCodeRow]) -> BTreeMap<RowKey, &str> {
    rows.iter()
        .map(|row| (row.key(), row.coverage_flag.as_str()))
        .collect()
}

fn record(change_type: ChangeType, key: RowKey, prev_flag: &str, curr_flag: &str) -> ChangeRecord {
    ChangeRecord {
        change_type,
        doc_family: key.doc_family,
        doc_id: key.doc_id,
        code_system: key.code_system,
        code: key.code,
        prev_flag: prev_flag.to_string(),
        curr_flag: curr_flag.to_string(),
    }
}

/// Classify every key of the union of `prev` and `curr`
///
/// # Examples
///
/// ```
/// use covharvest::core::diff::diff;
/// use covharvest::domain::{ChangeType, NormalizedCodeRow};
///
/// let row = NormalizedCodeRow {
///     doc_family: "Article".into(),
///     doc_id: "59636".into(),
///     code_system: "ICD10".into(),
///     code: "E11.9".into(),
///     description: String::new(),
///     coverage_flag: "covered".into(),
/// };
///
/// let changes = diff(&[row], &[]);
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].change_type, ChangeType::Removed);
/// assert_eq!(changes[0].prev_flag, "covered");
/// ```
pub fn diff(prev: &[NormalizedCodeRow], curr: &[NormalizedCodeRow]) -> Vec<ChangeRecord> {
    let prev = flag_map(prev);
    let curr = flag_map(curr);
    let mut changes = Vec::new();

    for (key, prev_flag) in &prev {
        match curr.get(key) {
            None => changes.push(record(ChangeType::Removed, key.clone(), prev_flag, "")),
            Some(curr_flag) if curr_flag != prev_flag => changes.push(record(
                ChangeType::FlagChanged,
                key.clone(),
                prev_flag,
                curr_flag,
            )),
            Some(_) => {}
        }
    }
    for (key, curr_flag) in &curr {
        if !prev.contains_key(key) {
            changes.push(record(ChangeType::Added, key.clone(), "", curr_flag));
        }
    }

    changes.sort_by(|a, b| {
        (&a.doc_family, &a.doc_id, &a.code_system, &a.code)
            .cmp(&(&b.doc_family, &b.doc_id, &b.code_system, &b.code))
    });
    changes
}

/// Diff against an optional baseline
///
/// A missing baseline is not an error: it yields an empty change log rather
/// than reporting the whole current snapshot as added. A baseline that was
/// read is always diffed, even when it holds no rows.
pub fn diff_against_baseline(
    prev: Option<&[NormalizedCodeRow]>,
    curr: &[NormalizedCodeRow],
) -> Vec<ChangeRecord> {
    let Some(prev) = prev else {
        tracing::info!(
            curr_rows = curr.len(),
            "No previous snapshot, writing an empty change log"
        );
        return Vec::new();
    };

    let changes = diff(prev, curr);
    let summary = ChangeSummary::from_changes(&changes);
    tracing::info!(
        prev_rows = prev.len(),
        curr_rows = curr.len(),
        added = summary.added,
        removed = summary.removed,
        flag_changed = summary.flag_changed,
        "Change detection completed"
    );
    changes
}

/// Keep only baseline rows belonging to `documents`
///
/// A run that harvested a slice of the catalog (one shard, an allow-list, a
/// capped list) can only speak for the documents it processed; rows of every
/// other document would otherwise all be reported as removed.
pub fn restrict_to_documents(
    prev: Vec<NormalizedCodeRow>,
    documents: &[DocumentRef],
) -> Vec<NormalizedCodeRow> {
    let scope: HashSet<(&str, &str)> = documents
        .iter()
        .map(|d| (d.family().as_str(), d.output_id()))
        .collect();
    let before = prev.len();
    let kept: Vec<NormalizedCodeRow> = prev
        .into_iter()
        .filter(|row| scope.contains(&(row.doc_family.as_str(), row.doc_id.as_str())))
        .collect();

    tracing::debug!(
        documents = documents.len(),
        baseline_rows = before,
        kept_rows = kept.len(),
        "Restricted baseline to assigned documents"
    );
    kept
}
