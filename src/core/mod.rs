//! Core harvest logic for covharvest.
//!
//! # Modules
//!
//! - [`resolve`] - Identifier resolution: candidate parameter shapes per endpoint
//! - [`normalize`] - Row normalization through alias tables
//! - [`partition`] - Deterministic shard assignment and work selection
//! - [`harvest`] - Run orchestration, snapshot aggregation, run summary
//! - [`diff`] - Change detection between two snapshots
//!
//! # Harvest Workflow
//!
//! 1. **Discover**: List candidate documents from the report endpoints
//! 2. **Partition**: Keep the documents assigned to this shard
//! 3. **Resolve**: Find the parameter shape each endpoint accepts for a document
//! 4. **Normalize**: Map raw rows onto the canonical code row
//! 5. **Aggregate**: Deduplicate into one snapshot sorted by key
//! 6. **Diff**: Classify changes against the previous snapshot
//!
//! # Example
//!
//! ```rust,no_run
//! use covharvest::adapters::coverage::{CoverageTransport, EndpointCatalog, ReportListing};
//! use covharvest::config::load_config;
//! use covharvest::core::harvest::HarvestOrchestrator;
//! use covharvest::core::partition::WorkSelection;
//! use covharvest::core::resolve::IdentifierResolver;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("covharvest.toml")?;
//!
//! let api = Arc::new(CoverageTransport::new(config.api.clone())?);
//! let orchestrator = HarvestOrchestrator::new(
//!     Arc::new(ReportListing::new(api.clone())),
//!     IdentifierResolver::new(api, EndpointCatalog::default()),
//! );
//!
//! let selection = WorkSelection::new(&config.shard, None, None, config.query.max_documents)?;
//! let output = orchestrator.run(&selection, &config.query).await?;
//!
//! println!("Rows: {}", output.rows.len());
//! println!("Zero-yield: {}", output.zero_yield.len());
//! # Ok(())
//! # }
//! ```

pub mod diff;
pub mod harvest;
pub mod normalize;
pub mod partition;
pub mod resolve;
