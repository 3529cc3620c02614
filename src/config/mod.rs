//! Configuration management for covharvest.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! covharvest uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `COVHARVEST_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use covharvest::config::load_config_or_default;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("covharvest.toml")?;
//! println!("API: {}", config.api.base_url);
//! println!("Shard {} of {}", config.shard.index, config.shard.count);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ApiConfig`] - Coverage API connection, token refresh and retries
//! - [`QueryConfig`] - Report listing filters and the document cap
//! - [`ShardConfig`] - Shard index, count and strategy
//! - [`OutputConfig`] - Output directory and diff baseline
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://api.coverage.cms.gov"
//! timeout_seconds = 30
//!
//! [query]
//! states = ["CA", "NY"]
//! status = "A"
//!
//! [shard]
//! index = ${SHARD_INDEX}
//! count = 4
//!
//! [output]
//! directory = "output"
//! previous_snapshot = "baseline/codes_normalized.csv"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApiConfig, ApplicationConfig, HarvestConfig, LoggingConfig, OutputConfig, PartitionStrategy,
    QueryConfig, RetryConfig, ShardConfig,
};
