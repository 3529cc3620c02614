//! Work selection: shard assignment, allow-list and document cap

use super::partition;
use crate::config::{PartitionStrategy, ShardConfig};
use crate::domain::{DocumentRef, HarvestError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Explicit set of identifiers restricting a run
///
/// Identifiers are compared case-insensitively against every identifier a
/// document carries (numeric, display, derived numeric).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    ids: Vec<String>,
}

impl AllowList {
    /// Parse newline-delimited identifiers; blank lines and `#` comments are
    /// ignored
    pub fn parse(text: &str) -> Self {
        let mut seen = HashSet::new();
        let ids = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_ascii_uppercase)
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self { ids }
    }

    /// Read a manifest file
    ///
    /// # Errors
    ///
    /// A missing or unreadable manifest is a configuration error.
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Configuration(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        let list = Self::parse(&text);
        if list.is_empty() {
            tracing::warn!(path = %path.display(), "Manifest lists no identifiers");
        }
        Ok(list)
    }

    /// Allow-list holding a single identifier
    pub fn single(id: &str) -> Self {
        Self::parse(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// True when any identifier of `doc` is listed
    pub fn matches(&self, doc: &DocumentRef) -> bool {
        doc.identifiers()
            .iter()
            .any(|id| self.ids.iter().any(|allowed| allowed.eq_ignore_ascii_case(id)))
    }
}

/// Documents assigned to one shard for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPlan {
    pub shard_index: usize,
    pub shard_count: usize,
    pub assigned: Vec<DocumentRef>,
}

impl ShardPlan {
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// True when this run is one slice of several
    pub fn is_sharded(&self) -> bool {
        self.shard_count > 1
    }
}

/// Typed selection parameters for a run
#[derive(Debug, Clone)]
pub struct WorkSelection {
    shard_index: usize,
    shard_count: usize,
    strategy: PartitionStrategy,
    allow_list: Option<AllowList>,
    max_documents: usize,
}

impl WorkSelection {
    /// Build a selection from the shard settings and the optional allow-list
    /// sources
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Configuration`] when both a manifest and a
    /// single document are given, when the manifest cannot be read, or when
    /// the shard index is out of range.
    pub fn new(
        shard: &ShardConfig,
        manifest: Option<&Path>,
        document: Option<&str>,
        max_documents: usize,
    ) -> Result<Self> {
        let document = document.map(str::trim).filter(|d| !d.is_empty());

        let allow_list = match (manifest, document) {
            (Some(_), Some(_)) => {
                return Err(HarvestError::Configuration(
                    "A manifest and a single document cannot be combined".to_string(),
                ));
            }
            (Some(path), None) => Some(AllowList::from_manifest(path)?),
            (None, Some(id)) => Some(AllowList::single(id)),
            (None, None) => None,
        };

        Self::from_parts(shard, allow_list, max_documents)
    }

    /// Build a selection from an already parsed allow-list
    pub fn from_parts(
        shard: &ShardConfig,
        allow_list: Option<AllowList>,
        max_documents: usize,
    ) -> Result<Self> {
        if shard.count == 0 {
            return Err(HarvestError::Configuration(
                "shard count must be at least 1".to_string(),
            ));
        }
        if shard.count > 1 && shard.index >= shard.count {
            return Err(HarvestError::Configuration(format!(
                "shard index {} is out of range for {} shards",
                shard.index, shard.count
            )));
        }

        Ok(Self {
            shard_index: shard.index,
            shard_count: shard.count,
            strategy: shard.strategy,
            allow_list,
            max_documents,
        })
    }

    /// Select everything in a single shard
    pub fn all() -> Self {
        Self {
            shard_index: 0,
            shard_count: 1,
            strategy: PartitionStrategy::default(),
            allow_list: None,
            max_documents: 0,
        }
    }

    pub fn allow_list(&self) -> Option<&AllowList> {
        self.allow_list.as_ref()
    }

    pub fn shard_index(&self) -> usize {
        self.shard_index
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// True when the run covers only a slice of the discovered documents
    pub fn is_partial(&self) -> bool {
        self.allow_list.is_some() || self.shard_count > 1 || self.max_documents > 0
    }

    /// Assign documents for this run
    ///
    /// An allow-list replaces partitioning: it is intersected against the
    /// full list and the shard settings are ignored. The document cap is
    /// applied last.
    pub fn plan(&self, documents: &[DocumentRef]) -> ShardPlan {
        let mut assigned = match &self.allow_list {
            Some(allow) => {
                let selected: Vec<DocumentRef> =
                    documents.iter().filter(|d| allow.matches(d)).cloned().collect();

                let unmatched: Vec<&String> = allow
                    .ids()
                    .iter()
                    .filter(|id| {
                        !selected.iter().any(|d| {
                            d.identifiers().iter().any(|x| x.eq_ignore_ascii_case(id))
                        })
                    })
                    .collect();
                if !unmatched.is_empty() {
                    tracing::warn!(
                        unmatched = unmatched.len(),
                        sample = ?unmatched.iter().take(5).collect::<Vec<_>>(),
                        "Allow-list identifiers not found among discovered documents"
                    );
                }
                selected
            }
            None => partition(documents, self.shard_index, self.shard_count, self.strategy),
        };

        if self.max_documents > 0 && assigned.len() > self.max_documents {
            tracing::info!(
                assigned = assigned.len(),
                max_documents = self.max_documents,
                "Truncating assigned documents to the configured cap"
            );
            assigned.truncate(self.max_documents);
        }

        let (shard_index, shard_count) = if self.allow_list.is_some() {
            (0, 1)
        } else {
            (self.shard_index, self.shard_count)
        };

        tracing::info!(
            discovered = documents.len(),
            assigned = assigned.len(),
            shard_index = shard_index,
            shard_count = shard_count,
            strategy = %self.strategy,
            allow_list = self.allow_list.is_some(),
            "Work assigned"
        );

        ShardPlan {
            shard_index,
            shard_count,
            assigned,
        }
    }
}
