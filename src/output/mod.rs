//! Flat output tables
//!
//! - `codes_normalized.csv`: the snapshot
//! - `document_nocodes.csv`: zero-yield documents
//! - `codes_changes.csv`: the change log
//!
//! Shard runs add `_shard_<i>_of_<n>` before the extension. Headers are
//! written even when a table is empty.

pub mod merge;
pub mod tables;

pub use merge::{merge_shard_outputs, MergeReport};
pub use tables::{
    read_snapshot, read_snapshot_if_present, read_zero_yield, write_changes, write_snapshot,
    write_zero_yield, CHANGES_HEADER, CODES_HEADER, NOCODES_HEADER,
};

use std::path::{Path, PathBuf};

pub const CODES_STEM: &str = "codes_normalized";
pub const NOCODES_STEM: &str = "document_nocodes";
pub const CHANGES_STEM: &str = "codes_changes";

/// File-name suffix for a shard run; empty for an unsharded run
pub fn shard_suffix(shard_index: usize, shard_count: usize) -> String {
    if shard_count > 1 {
        format!("_shard_{shard_index}_of_{shard_count}")
    } else {
        String::new()
    }
}

/// Paths of the three tables written by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    directory: PathBuf,
    suffix: String,
}

impl OutputPaths {
    pub fn new(directory: impl Into<PathBuf>, shard_index: usize, shard_count: usize) -> Self {
        Self {
            directory: directory.into(),
            suffix: shard_suffix(shard_index, shard_count),
        }
    }

    /// Unsuffixed paths (merged or single-shard output)
    pub fn unsharded(directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, 0, 1)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn codes(&self) -> PathBuf {
        self.file(CODES_STEM)
    }

    pub fn nocodes(&self) -> PathBuf {
        self.file(NOCODES_STEM)
    }

    pub fn changes(&self) -> PathBuf {
        self.file(CHANGES_STEM)
    }

    fn file(&self, stem: &str) -> PathBuf {
        self.directory.join(format!("{}{}.csv", stem, self.suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_suffix() {
        assert_eq!(shard_suffix(0, 1), "");
        assert_eq!(shard_suffix(2, 8), "_shard_2_of_8");
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new("out", 1, 4);
        assert_eq!(paths.codes(), PathBuf::from("out/codes_normalized_shard_1_of_4.csv"));
        assert_eq!(paths.nocodes(), PathBuf::from("out/document_nocodes_shard_1_of_4.csv"));

        let merged = OutputPaths::unsharded("out");
        assert_eq!(merged.changes(), PathBuf::from("out/codes_changes.csv"));
    }
}
