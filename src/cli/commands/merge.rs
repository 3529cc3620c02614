//! Merge command implementation

use crate::output::merge_shard_outputs;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Directory holding the shard tables
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the merged tables (defaults to the input directory)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl MergeArgs {
    /// Execute the merge command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let output = self.output.clone().unwrap_or_else(|| self.input.clone());
        tracing::info!(
            input = %self.input.display(),
            output = %output.display(),
            "Starting merge command"
        );

        match merge_shard_outputs(&self.input, &output) {
            Ok(report) => {
                println!("📊 Merge Summary:");
                println!("  Code tables: {}", report.code_files);
                println!("  No-code tables: {}", report.nocode_files);
                println!("  Code rows: {}", report.code_rows);
                println!("  Duplicate rows dropped: {}", report.duplicate_rows);
                println!("  Zero-yield documents: {}", report.nocode_rows);
                println!();
                println!("✅ Merged tables written to {}", output.display());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Merge failed");
                eprintln!("Merge failed: {e}");
                Ok(5)
            }
        }
    }
}
