//! Probe command implementation
//!
//! Resolves one identifier across every applicable row family and prints the
//! row counts and the winning parameter shape per family.

use crate::adapters::coverage::{CoverageTransport, EndpointCatalog, StaticDocuments};
use crate::config::load_config_or_default;
use crate::core::harvest::{FamilyResult, HarvestOrchestrator};
use crate::core::resolve::IdentifierResolver;
use crate::domain::{DocumentFamily, DocumentRef};
use clap::Args;
use std::sync::Arc;

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Numeric id (59636) or display id (A59636, L36668)
    pub id: String,

    /// Document family when it cannot be inferred from the id (article, lcd)
    #[arg(long)]
    pub family: Option<DocumentFamily>,

    /// Document version to include in the parameter shapes
    #[arg(long)]
    pub version: Option<String>,
}

impl ProbeArgs {
    /// Build the document reference to probe
    pub fn document(&self) -> Result<DocumentRef, String> {
        let doc = DocumentRef::from_identifier(&self.id, self.family)?;
        Ok(match &self.version {
            Some(version) => doc.with_version(version.clone()),
            None => doc,
        })
    }

    /// Execute the probe command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let doc = match self.document() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let transport = match CoverageTransport::new(config.api.clone()) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let orchestrator = HarvestOrchestrator::new(
            Arc::new(StaticDocuments::new(vec![doc.clone()])),
            IdentifierResolver::new(transport, EndpointCatalog::default()),
        );

        println!("🔍 Probing {doc}");
        println!();

        let harvest = orchestrator.process_document(&doc).await;
        for family in &harvest.families {
            match &family.result {
                FamilyResult::Rows {
                    path,
                    shape,
                    raw,
                    normalized,
                } => println!(
                    "  {:<20} {} rows ({} raw) via {} {} after {} shape(s)",
                    family.row_family.as_str(),
                    normalized,
                    raw,
                    path,
                    shape,
                    family.attempts
                ),
                FamilyResult::Empty => println!(
                    "  {:<20} empty after {} shape(s)",
                    family.row_family.as_str(),
                    family.attempts
                ),
                FamilyResult::Unsupported => println!(
                    "  {:<20} endpoint unsupported",
                    family.row_family.as_str()
                ),
                FamilyResult::Failed { message, .. } => println!(
                    "  {:<20} failed: {}",
                    family.row_family.as_str(),
                    message
                ),
            }
        }
        println!();

        match &harvest.zero_yield {
            Some(record) => println!("⚠️  No rows ({})", record.reason),
            None => println!("✅ {} rows", harvest.rows.len()),
        }

        Ok(if harvest.failed_families() > 0 { 1 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_document_with_version() {
        let args = ProbeArgs {
            id: "A59636".to_string(),
            family: None,
            version: Some("12".to_string()),
        };
        let doc = args.document().unwrap();
        assert_eq!(doc.family(), DocumentFamily::Article);
        assert_eq!(doc.version(), Some("12"));
    }

    #[test]
    fn test_probe_numeric_id_with_family() {
        let args = ProbeArgs {
            id: "36668".to_string(),
            family: Some(DocumentFamily::Determination),
            version: None,
        };
        assert_eq!(args.document().unwrap().family(), DocumentFamily::Determination);
    }
}
