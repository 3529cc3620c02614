//! Snapshot aggregation
//!
//! Collects normalized rows from every row family of every document and
//! enforces key uniqueness on `(doc_family, doc_id, code_system, code)`.

use crate::domain::{NormalizedCodeRow, RowFamily, RowKey};
use std::collections::BTreeMap;

/// Two row families reported different coverage flags for the same key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagConflict {
    pub key: RowKey,
    pub kept_family: RowFamily,
    pub kept_flag: String,
    pub dropped_family: RowFamily,
    pub dropped_flag: String,
}

#[derive(Debug, Clone)]
struct Entry {
    family: RowFamily,
    row: NormalizedCodeRow,
}

/// Accumulates the current-run snapshot
///
/// Collision rules:
/// - same row family: the later row replaces the earlier one
/// - different families, equal flag: the first row is kept and an empty
///   description is back-filled from the later row
/// - different families, differing flag: the row from the family earlier in
///   catalog order is kept and a [`FlagConflict`] is recorded
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entries: BTreeMap<RowKey, Entry>,
    conflicts: Vec<FlagConflict>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: RowFamily, row: NormalizedCodeRow) {
        let key = row.key();

        let Some(existing) = self.entries.get_mut(&key) else {
            self.entries.insert(key, Entry { family, row });
            return;
        };

        if existing.family == family {
            existing.row = row;
            return;
        }

        if existing.row.coverage_flag == row.coverage_flag {
            if existing.row.description.is_empty() && !row.description.is_empty() {
                existing.row.description = row.description;
            }
            return;
        }

        let (kept, dropped) = if family < existing.family {
            let previous = std::mem::replace(existing, Entry { family, row });
            (existing.clone(), previous)
        } else {
            (existing.clone(), Entry { family, row })
        };

        tracing::warn!(
            key = %key,
            kept_family = %kept.family,
            kept_flag = %kept.row.coverage_flag,
            dropped_family = %dropped.family,
            dropped_flag = %dropped.row.coverage_flag,
            "Row families disagree on coverage flag"
        );

        self.conflicts.push(FlagConflict {
            key,
            kept_family: kept.family,
            kept_flag: kept.row.coverage_flag,
            dropped_family: dropped.family,
            dropped_flag: dropped.row.coverage_flag,
        });
    }

    pub fn extend(&mut self, family: RowFamily, rows: impl IntoIterator<Item = NormalizedCodeRow>) {
        for row in rows {
            self.insert(family, row);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows sorted by key, plus every recorded conflict
    pub fn finish(self) -> (Vec<NormalizedCodeRow>, Vec<FlagConflict>) {
        let rows = self.entries.into_values().map(|entry| entry.row).collect();
        (rows, self.conflicts)
    }
}
