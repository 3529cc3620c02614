// Covharvest - Coverage Policy Code Table Harvester
// Copyright (c) 2025 Covharvest Contributors
// Licensed under the MIT License

//! # Covharvest - Coverage Policy Code Table Harvester
//!
//! Covharvest walks the public coverage API, pulls the code tables attached
//! to every Article and Local Coverage Determination, normalizes them into
//! one canonical row shape and reports what changed since the previous run.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Discovering** candidate documents from the report endpoints
//! - **Resolving** each document and row family to a working endpoint and
//!   parameter shape
//! - **Normalizing** heterogeneous rows into [`domain::NormalizedCodeRow`]
//! - **Partitioning** the document list across independent shard runs
//! - **Diffing** the current snapshot against a previous one
//!
//! ## Architecture
//!
//! Covharvest follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (resolve, normalize, harvest, partition, diff)
//! - [`adapters`] - Coverage API transport, license token and endpoint catalog
//! - [`output`] - CSV tables and shard merging
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! Comparing two snapshot tables written by earlier runs:
//!
//! ```rust,no_run
//! use covharvest::core::diff::{diff, ChangeSummary};
//! use covharvest::output::read_snapshot;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let prev = read_snapshot(Path::new("baseline/codes_normalized.csv"))?;
//! let curr = read_snapshot(Path::new("output/codes_normalized.csv"))?;
//!
//! let changes = diff(&prev, &curr);
//! let summary = ChangeSummary::from_changes(&changes);
//! println!("{} added, {} removed", summary.added, summary.removed);
//! # Ok(())
//! # }
//! ```
//!
//! See [`core`] for running a full harvest.
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], backed by
//! [`domain::HarvestError`]. Per-call API failures are classified as
//! [`domain::CoverageApiError`] so the resolver can tell an unsupported
//! endpoint from a transient outage.
//!
//! ## Logging
//!
//! Covharvest uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(shard_index = 0, shard_count = 4, "Starting harvest");
//! warn!(doc = "A59636", "Document produced no rows");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod output;
