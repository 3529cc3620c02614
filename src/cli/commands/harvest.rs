//! Harvest command implementation
//!
//! Runs one shard against the coverage API and writes the snapshot, the
//! zero-yield table and the change log.

use crate::adapters::coverage::{CoverageTransport, EndpointCatalog, ReportListing};
use crate::config::{load_config_or_default, HarvestConfig};
use crate::core::diff::ChangeSummary;
use crate::core::harvest::{HarvestOrchestrator, HarvestOutput};
use crate::core::partition::WorkSelection;
use crate::core::resolve::IdentifierResolver;
use crate::domain::Result;
use crate::output::{
    read_snapshot_if_present, write_changes, write_snapshot, write_zero_yield, OutputPaths,
};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the harvest command
#[derive(Args, Debug, Default)]
pub struct HarvestArgs {
    /// Harvest a single document (numeric or display id)
    #[arg(long, conflicts_with = "manifest")]
    pub document: Option<String>,

    /// File of newline-delimited identifiers restricting the run
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Shard index (0-based)
    #[arg(long)]
    pub shard_index: Option<usize>,

    /// Total number of shards
    #[arg(long)]
    pub shard_count: Option<usize>,

    /// Cap on assigned documents (0 = unlimited)
    #[arg(long)]
    pub max_documents: Option<usize>,

    /// Directory for the output tables
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Previous normalized snapshot to diff against
    #[arg(long)]
    pub previous: Option<String>,
}

impl HarvestArgs {
    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut HarvestConfig) {
        if let Some(index) = self.shard_index {
            config.shard.index = index;
        }
        if let Some(count) = self.shard_count {
            config.shard.count = count;
        }
        if let Some(max) = self.max_documents {
            config.query.max_documents = max;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(previous) = &self.previous {
            config.output.previous_snapshot = Some(previous.clone());
        }
    }

    /// Execute the harvest command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting harvest command");

        // Load configuration
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let selection = match WorkSelection::new(
            &config.shard,
            self.manifest.as_deref(),
            self.document.as_deref(),
            config.query.max_documents,
        ) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Invalid work selection");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let transport = match CoverageTransport::new(config.api.clone()) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create coverage API transport");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let orchestrator = HarvestOrchestrator::new(
            Arc::new(ReportListing::new(transport.clone())),
            IdentifierResolver::new(transport, EndpointCatalog::default()),
        );

        println!("🚀 Starting harvest...");
        println!();

        let output = match orchestrator.run(&selection, &config.query).await {
            Ok(o) => o,
            Err(e) if e.is_configuration() => {
                eprintln!("{e}");
                return Ok(2);
            }
            Err(e) => {
                tracing::error!(error = %e, "Harvest failed");
                eprintln!("Harvest failed: {e}");
                return Ok(5);
            }
        };

        let changes = match self.write_outputs(&config, &selection, &output) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write output tables");
                eprintln!("Failed to write output tables: {e}");
                return Ok(5);
            }
        };

        output.summary.log_summary();
        print_summary(&output, &changes);

        if output.summary.is_degraded() {
            println!("⚠️  Harvest completed with degraded data");
            Ok(1)
        } else {
            println!("✅ Harvest completed successfully!");
            Ok(0)
        }
    }

    /// Write the three tables; returns the change counts
    fn write_outputs(
        &self,
        config: &HarvestConfig,
        selection: &WorkSelection,
        output: &HarvestOutput,
    ) -> Result<ChangeSummary> {
        let paths = OutputPaths::new(
            &config.output.directory,
            output.summary.shard_index,
            output.summary.shard_count,
        );

        write_snapshot(&paths.codes(), &output.rows)?;
        write_zero_yield(&paths.nocodes(), &output.zero_yield)?;

        let baseline = match config.output.previous_snapshot.as_deref() {
            Some(path) => read_snapshot_if_present(Path::new(path))?,
            None => None,
        };
        let changes = output.changes_against(baseline, selection.is_partial());
        write_changes(&paths.changes(), &changes)?;

        Ok(ChangeSummary::from_changes(&changes))
    }
}

fn print_summary(output: &HarvestOutput, changes: &ChangeSummary) {
    let summary = &output.summary;

    println!();
    println!("📊 Harvest Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Shard: {} of {}", summary.shard_index, summary.shard_count);
    println!("  Discovered: {}", summary.discovered);
    println!("  Assigned: {}", summary.assigned);
    println!("  Documents with rows: {}", summary.documents_with_rows);
    println!("  Zero-yield documents: {}", summary.zero_yield);
    println!("  Normalized rows: {}", summary.normalized_rows);
    println!("  Shapes tried: {}", summary.shapes_tried);
    println!("  Family failures: {}", summary.family_failures);
    println!("  Flag conflicts: {}", summary.flag_conflicts);
    println!(
        "  Changes: {} added, {} removed, {} flag changed",
        changes.added, changes.removed, changes.flag_changed
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.issues.is_empty() {
        println!("⚠️  Issues encountered:");
        for issue in summary.issues.iter().take(20) {
            println!("  - {:?}: {}", issue.issue_type, issue.message);
            if let Some(context) = &issue.context {
                println!("    Context: {context}");
            }
        }
        if summary.issues.len() > 20 {
            println!("  ... and {} more", summary.issues.len() - 20);
        }
        println!();
    }
}
