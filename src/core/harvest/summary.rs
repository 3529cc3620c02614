//! Harvest summary and reporting
//!
//! This module defines structures for tracking and reporting the result of a
//! shard run.

use crate::domain::{CoverageApiError, HarvestError};
use std::time::Duration;
use uuid::Uuid;

/// Summary of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    /// Unique id of this run, repeated in every log line of the summary
    pub run_id: Uuid,

    /// Shard this run processed
    pub shard_index: usize,

    /// Total number of shards
    pub shard_count: usize,

    /// Documents returned by the listing
    pub discovered: usize,

    /// Documents assigned to this shard
    pub assigned: usize,

    /// Documents processed
    pub processed: usize,

    /// Documents that yielded at least one row
    pub documents_with_rows: usize,

    /// Documents recorded as zero-yield
    pub zero_yield: usize,

    /// Zero-yield documents whose emptiness involves fetch failures
    pub degraded_zero_yield: usize,

    /// Rows in the final snapshot
    pub normalized_rows: usize,

    /// Row families fetched successfully (with or without rows)
    pub families_fetched: usize,

    /// Row families whose fetch failed
    pub family_failures: usize,

    /// Parameter shapes sent to the API
    pub shapes_tried: usize,

    /// Keys on which two row families disagreed about the coverage flag
    pub flag_conflicts: usize,

    /// True when the document listing itself failed
    pub listing_failed: bool,

    /// Duration of the run
    pub duration: Duration,

    /// Issues encountered during the run
    pub issues: Vec<HarvestIssue>,
}

impl HarvestSummary {
    /// Create a new empty summary with a fresh run id
    pub fn new(shard_index: usize, shard_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            shard_index,
            shard_count,
            discovered: 0,
            assigned: 0,
            processed: 0,
            documents_with_rows: 0,
            zero_yield: 0,
            degraded_zero_yield: 0,
            normalized_rows: 0,
            families_fetched: 0,
            family_failures: 0,
            shapes_tried: 0,
            flag_conflicts: 0,
            listing_failed: false,
            duration: Duration::from_secs(0),
            issues: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_issue(&mut self, issue: HarvestIssue) {
        self.issues.push(issue);
    }

    /// True when the outputs may be missing data because of failures
    pub fn is_degraded(&self) -> bool {
        self.listing_failed || self.degraded_zero_yield > 0
    }

    /// Share of processed documents that yielded rows, as a percentage
    pub fn yield_rate(&self) -> f64 {
        if self.processed == 0 {
            return 100.0;
        }
        (self.documents_with_rows as f64 / self.processed as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            shard_index = self.shard_index,
            shard_count = self.shard_count,
            discovered = self.discovered,
            assigned = self.assigned,
            processed = self.processed,
            documents_with_rows = self.documents_with_rows,
            zero_yield = self.zero_yield,
            normalized_rows = self.normalized_rows,
            families_fetched = self.families_fetched,
            family_failures = self.family_failures,
            shapes_tried = self.shapes_tried,
            flag_conflicts = self.flag_conflicts,
            duration_secs = self.duration.as_secs(),
            yield_rate = format!("{:.2}%", self.yield_rate()),
            "Harvest completed"
        );

        if !self.issues.is_empty() {
            tracing::warn!(
                run_id = %self.run_id,
                issue_count = self.issues.len(),
                degraded = self.is_degraded(),
                "Harvest completed with issues"
            );
            for issue in &self.issues {
                tracing::warn!(
                    issue_type = ?issue.issue_type,
                    message = %issue.message,
                    context = ?issue.context,
                    "Harvest issue"
                );
            }
        }
    }
}

/// Kind of issue recorded during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// The document listing failed
    Listing,
    /// Retries exhausted on 429/5xx, timeout or connection failure
    Transient,
    /// 401/403 persisted after a token refresh
    Authentication,
    /// Two row families disagreed on a coverage flag
    FlagConflict,
    /// Anything else
    Unknown,
}

impl IssueType {
    /// Classify an error surfaced while fetching a row family
    pub fn from_error(error: &HarvestError) -> Self {
        match error {
            HarvestError::CoverageApi(CoverageApiError::AuthenticationFailed { .. }) => {
                IssueType::Authentication
            }
            HarvestError::CoverageApi(_) => IssueType::Transient,
            _ => IssueType::Unknown,
        }
    }
}

/// Issue with context
#[derive(Debug, Clone)]
pub struct HarvestIssue {
    pub issue_type: IssueType,
    pub message: String,
    /// Optional context (document, row family)
    pub context: Option<String>,
}

impl HarvestIssue {
    pub fn new(issue_type: IssueType, message: impl Into<String>) -> Self {
        Self {
            issue_type,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_creation() {
        let summary = HarvestSummary::new(2, 4);

        assert_eq!(summary.shard_index, 2);
        assert_eq!(summary.shard_count, 4);
        assert_eq!(summary.processed, 0);
        assert!(summary.issues.is_empty());
        assert!(!summary.is_degraded());
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(HarvestSummary::new(0, 1).run_id, HarvestSummary::new(0, 1).run_id);
    }

    #[test]
    fn test_yield_rate() {
        let mut summary = HarvestSummary::new(0, 1);
        assert_eq!(summary.yield_rate(), 100.0);

        summary.processed = 4;
        summary.documents_with_rows = 3;
        assert_eq!(summary.yield_rate(), 75.0);
    }

    #[test]
    fn test_degraded_when_failures_cause_zero_yield() {
        let mut summary = HarvestSummary::new(0, 1);
        summary.zero_yield = 2;
        assert!(!summary.is_degraded());

        summary.degraded_zero_yield = 1;
        assert!(summary.is_degraded());
    }

    #[test]
    fn test_issue_classification() {
        let auth = HarvestError::CoverageApi(CoverageApiError::authentication(403, "denied"));
        let transient = HarvestError::CoverageApi(CoverageApiError::transient(Some(503), "busy"));

        assert_eq!(IssueType::from_error(&auth), IssueType::Authentication);
        assert_eq!(IssueType::from_error(&transient), IssueType::Transient);
        assert_eq!(
            IssueType::from_error(&HarvestError::Other("x".into())),
            IssueType::Unknown
        );
    }

    #[test]
    fn test_issue_with_context() {
        let issue = HarvestIssue::new(IssueType::Listing, "report unavailable")
            .with_context("Article");
        assert_eq!(issue.context.as_deref(), Some("Article"));
    }
}
