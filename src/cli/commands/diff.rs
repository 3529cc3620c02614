//! Diff command implementation
//!
//! Standalone change detection between two normalized snapshot files.

use crate::core::diff::{diff_against_baseline, ChangeSummary};
use crate::domain::Result;
use crate::output::{read_snapshot, read_snapshot_if_present, write_changes};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the diff command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Previous snapshot; a missing file yields an empty change log
    #[arg(long)]
    pub prev: PathBuf,

    /// Current snapshot
    #[arg(long)]
    pub curr: PathBuf,

    /// Change log to write
    #[arg(long, default_value = "codes_changes.csv")]
    pub out: PathBuf,
}

impl DiffArgs {
    /// Execute the diff command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(
            prev = %self.prev.display(),
            curr = %self.curr.display(),
            "Starting diff command"
        );

        match self.run() {
            Ok(summary) => {
                println!("📊 Change Summary:");
                println!("  Added: {}", summary.added);
                println!("  Removed: {}", summary.removed);
                println!("  Flag changed: {}", summary.flag_changed);
                println!();
                println!("✅ Change log written: {}", self.out.display());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Diff failed");
                eprintln!("Diff failed: {e}");
                Ok(5)
            }
        }
    }

    fn run(&self) -> Result<ChangeSummary> {
        let curr = read_snapshot(&self.curr)?;
        let prev = read_snapshot_if_present(&self.prev)?;

        let changes = diff_against_baseline(prev.as_deref(), &curr);
        write_changes(&self.out, &changes)?;
        Ok(ChangeSummary::from_changes(&changes))
    }
}
