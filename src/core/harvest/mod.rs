//! Harvest orchestration
//!
//! Runs one shard: lists documents, partitions them, resolves and fetches
//! every applicable row family per document, and aggregates the snapshot.

pub mod aggregate;
pub mod orchestrator;
pub mod summary;

pub use aggregate::{FlagConflict, SnapshotBuilder};
pub use orchestrator::{
    DocumentHarvest, FamilyOutcome, FamilyResult, HarvestOrchestrator, HarvestOutput,
};
pub use summary::{HarvestIssue, HarvestSummary, IssueType};
