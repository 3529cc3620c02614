//! Harvest orchestrator - drives one shard run
//!
//! Discover → Partition → (per document: Resolve+Fetch → Normalize →
//! Aggregate) → Emit. Documents are processed one after another; each
//! document's row families are independent, and a failure in one family
//! never aborts the document or the run.

use crate::adapters::coverage::DocumentSource;
use crate::config::QueryConfig;
use crate::core::diff::{diff_against_baseline, restrict_to_documents};
use crate::core::harvest::aggregate::SnapshotBuilder;
use crate::core::harvest::summary::{HarvestIssue, HarvestSummary, IssueType};
use crate::core::normalize::normalize_rows;
use crate::core::partition::{ShardPlan, WorkSelection};
use crate::core::resolve::{IdentifierResolver, Resolution};
use crate::domain::{
    ChangeRecord, DocumentRef, NormalizedCodeRow, ParameterShape, Result, RowFamily,
    ZeroYieldReason, ZeroYieldRecord,
};
use std::sync::Arc;
use std::time::Instant;

/// What happened to one row family of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyResult {
    /// A shape yielded rows
    Rows {
        path: String,
        shape: ParameterShape,
        raw: usize,
        normalized: usize,
    },
    /// Every shape answered empty
    Empty,
    /// No endpoint serves this family for the document's family
    Unsupported,
    /// The transport gave up
    Failed { issue: IssueType, message: String },
}

/// Per-family outcome for one document
#[derive(Debug, Clone)]
pub struct FamilyOutcome {
    pub row_family: RowFamily,
    pub attempts: usize,
    pub result: FamilyResult,
}

/// Everything one document produced
#[derive(Debug, Clone)]
pub struct DocumentHarvest {
    pub document: DocumentRef,
    pub rows: Vec<(RowFamily, NormalizedCodeRow)>,
    pub families: Vec<FamilyOutcome>,
    pub zero_yield: Option<ZeroYieldRecord>,
}

impl DocumentHarvest {
    pub fn failed_families(&self) -> usize {
        self.families
            .iter()
            .filter(|f| matches!(f.result, FamilyResult::Failed { .. }))
            .count()
    }
}

/// Collections handed to the output writer
#[derive(Debug)]
pub struct HarvestOutput {
    /// Snapshot rows, sorted by key
    pub rows: Vec<NormalizedCodeRow>,
    /// Documents with zero rows, in processing order
    pub zero_yield: Vec<ZeroYieldRecord>,
    /// Documents this run was responsible for
    pub assigned: Vec<DocumentRef>,
    pub summary: HarvestSummary,
}

impl HarvestOutput {
    /// Change log of this run against a previous snapshot
    ///
    /// A run whose listing failed knows nothing about the catalog and yields
    /// no changes. A partial run only compares the documents it was assigned.
    pub fn changes_against(
        &self,
        baseline: Option<Vec<NormalizedCodeRow>>,
        partial: bool,
    ) -> Vec<ChangeRecord> {
        if self.summary.listing_failed {
            tracing::warn!("Document listing failed, skipping change detection");
            return Vec::new();
        }

        let baseline = baseline.map(|prev| {
            if partial {
                restrict_to_documents(prev, &self.assigned)
            } else {
                prev
            }
        });
        diff_against_baseline(baseline.as_deref(), &self.rows)
    }
}

/// Harvest orchestrator
pub struct HarvestOrchestrator {
    source: Arc<dyn DocumentSource>,
    resolver: IdentifierResolver,
}

impl HarvestOrchestrator {
    pub fn new(source: Arc<dyn DocumentSource>, resolver: IdentifierResolver) -> Self {
        Self { source, resolver }
    }

    pub fn resolver(&self) -> &IdentifierResolver {
        &self.resolver
    }

    /// Execute a full shard run
    ///
    /// A failing document listing is logged and yields empty output flagged
    /// as degraded.
    ///
    /// # Errors
    ///
    /// Only configuration errors surfaced by the listing are returned.
    pub async fn run(&self, selection: &WorkSelection, query: &QueryConfig) -> Result<HarvestOutput> {
        let start_time = Instant::now();

        tracing::info!("Starting harvest");

        // Discover
        let documents = match self.source.list_documents(query).await {
            Ok(documents) => documents,
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                tracing::error!(error = %e, "Document listing failed");
                let mut summary =
                    HarvestSummary::new(selection.shard_index(), selection.shard_count());
                summary.listing_failed = true;
                summary.add_issue(HarvestIssue::new(IssueType::Listing, e.to_string()));
                return Ok(HarvestOutput {
                    rows: Vec::new(),
                    zero_yield: Vec::new(),
                    assigned: Vec::new(),
                    summary: summary.with_duration(start_time.elapsed()),
                });
            }
        };

        // Partition
        let plan = selection.plan(&documents);

        let mut output = self.harvest_plan(&plan).await;
        output.summary.discovered = documents.len();
        output.summary.duration = start_time.elapsed();
        Ok(output)
    }

    /// Harvest every document of an already computed plan
    pub async fn harvest_plan(&self, plan: &ShardPlan) -> HarvestOutput {
        let start_time = Instant::now();
        let mut summary = HarvestSummary::new(plan.shard_index, plan.shard_count);
        summary.discovered = plan.len();
        summary.assigned = plan.len();

        let mut builder = SnapshotBuilder::new();
        let mut zero_yield = Vec::new();

        for (position, doc) in plan.assigned.iter().enumerate() {
            let harvest = self.process_document(doc).await;

            summary.processed += 1;
            for family in &harvest.families {
                summary.shapes_tried += family.attempts;
                match &family.result {
                    FamilyResult::Failed { issue, message } => {
                        summary.family_failures += 1;
                        summary.add_issue(
                            HarvestIssue::new(*issue, message.clone())
                                .with_context(format!("{} {}", doc.label(), family.row_family)),
                        );
                    }
                    _ => summary.families_fetched += 1,
                }
            }

            let failed = harvest.failed_families();
            match harvest.zero_yield {
                Some(record) => {
                    summary.zero_yield += 1;
                    if failed > 0 {
                        summary.degraded_zero_yield += 1;
                    }
                    zero_yield.push(record);
                }
                None => summary.documents_with_rows += 1,
            }

            for (family, row) in harvest.rows {
                builder.insert(family, row);
            }

            if (position + 1) % 50 == 0 {
                tracing::info!(
                    processed = position + 1,
                    assigned = plan.len(),
                    rows = builder.len(),
                    "Harvest progress"
                );
            }
        }

        if builder.is_empty() && !plan.is_empty() {
            tracing::warn!(assigned = plan.len(), "No document in this shard yielded rows");
        }

        let unsupported = self.resolver.availability().len().await;
        if unsupported > 0 {
            tracing::info!(
                unsupported_endpoints = unsupported,
                "Endpoints skipped as unsupported during this run"
            );
        }

        let (rows, conflicts) = builder.finish();
        summary.normalized_rows = rows.len();
        summary.flag_conflicts = conflicts.len();
        for conflict in conflicts {
            summary.add_issue(
                HarvestIssue::new(
                    IssueType::FlagConflict,
                    format!(
                        "{} kept '{}' over {} '{}'",
                        conflict.kept_family,
                        conflict.kept_flag,
                        conflict.dropped_family,
                        conflict.dropped_flag
                    ),
                )
                .with_context(conflict.key.to_string()),
            );
        }

        HarvestOutput {
            rows,
            zero_yield,
            assigned: plan.assigned.clone(),
            summary: summary.with_duration(start_time.elapsed()),
        }
    }

    /// Resolve and fetch every applicable row family of one document
    pub async fn process_document(&self, doc: &DocumentRef) -> DocumentHarvest {
        let row_families = self.resolver.catalog().families_for(doc.family());
        let mut rows = Vec::new();
        let mut families = Vec::with_capacity(row_families.len());

        for row_family in row_families {
            let outcome = match self.resolver.resolve(doc, row_family).await {
                Ok(Resolution::Found {
                    path,
                    shape,
                    rows: raw,
                    attempts,
                }) => {
                    let normalized = normalize_rows(doc, row_family, &raw);
                    let count = normalized.len();
                    rows.extend(normalized.into_iter().map(|row| (row_family, row)));
                    FamilyOutcome {
                        row_family,
                        attempts,
                        result: FamilyResult::Rows {
                            path,
                            shape,
                            raw: raw.len(),
                            normalized: count,
                        },
                    }
                }
                Ok(Resolution::Exhausted { attempts }) => FamilyOutcome {
                    row_family,
                    attempts,
                    result: FamilyResult::Empty,
                },
                Ok(Resolution::Unsupported { attempts }) => FamilyOutcome {
                    row_family,
                    attempts,
                    result: FamilyResult::Unsupported,
                },
                Err(e) => {
                    let issue = IssueType::from_error(&e);
                    tracing::warn!(
                        document = %doc,
                        row_family = %row_family,
                        issue = ?issue,
                        error = %e,
                        "Row family fetch failed"
                    );
                    FamilyOutcome {
                        row_family,
                        attempts: 0,
                        result: FamilyResult::Failed {
                            issue,
                            message: e.to_string(),
                        },
                    }
                }
            };
            families.push(outcome);
        }

        let zero_yield = if rows.is_empty() {
            let reason = zero_yield_reason(&families);
            tracing::info!(document = %doc, reason = %reason, "Document yielded no rows");
            Some(ZeroYieldRecord::new(
                doc.family(),
                doc.output_id(),
                doc.display_id().map(|d| d.as_str()).unwrap_or_default(),
                reason,
            ))
        } else {
            tracing::debug!(document = %doc, rows = rows.len(), "Document harvested");
            None
        };

        DocumentHarvest {
            document: doc.clone(),
            rows,
            families,
            zero_yield,
        }
    }
}

/// Reason recorded for a document that produced no rows
fn zero_yield_reason(families: &[FamilyOutcome]) -> ZeroYieldReason {
    let failed = families
        .iter()
        .filter(|f| matches!(f.result, FamilyResult::Failed { .. }))
        .count();

    if families.is_empty() {
        ZeroYieldReason::NoApplicableFamilies
    } else if failed == families.len() {
        ZeroYieldReason::FetchFailed
    } else if failed > 0 {
        ZeroYieldReason::NoRowsPartialFailure
    } else {
        ZeroYieldReason::NoRows
    }
}
