//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "covharvest.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing covharvest configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your filters", self.output);
                println!("  2. Validate configuration: covharvest validate-config");
                println!("  3. Run a harvest: covharvest harvest");
                println!("  4. Shard a large run: covharvest harvest --shard-index 0 --shard-count 4");
                println!("  5. Combine shards: covharvest merge --input output");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# covharvest configuration

[application]
log_level = "info"

[api]
base_url = "https://api.coverage.cms.gov"
timeout_seconds = 30

[query]
states = []
contractors = []
max_documents = 0

[shard]
index = 0
count = 1
strategy = "hash"

[output]
directory = "output"
# previous_snapshot = "output/previous/codes_normalized.csv"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# covharvest configuration
#
# Every value can be overridden with COVHARVEST_<SECTION>_<KEY>, for example
# COVHARVEST_SHARD_INDEX=3. Values may reference environment variables with
# ${VAR_NAME}.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG overrides
log_level = "info"

# ============================================================================
# Coverage API
# ============================================================================
[api]
# Base URL of the coverage API
base_url = "https://api.coverage.cms.gov"

# User-Agent header
user_agent = "covharvest"

# Per-call timeout in seconds (timeouts are retried)
timeout_seconds = 30

# TCP connect timeout in seconds
connect_timeout_seconds = 10

# Re-acquire the license token once it is older than this (seconds)
token_refresh_after_secs = 3300

[api.retry]
# Attempts for 429, 5xx, timeouts and connection failures (1-10)
max_attempts = 4

# Delay before the first retry
initial_delay_ms = 750

# Upper bound for any retry delay
max_delay_ms = 8000

# Growth factor between retries
backoff_multiplier = 2.0

# Randomize each delay between half and all of its value
jitter = true

# ============================================================================
# Document Discovery
# ============================================================================
[query]
# Two-letter state filters (empty = all)
states = ["CA", "NY"]

# Document status filter
# status = "A"

# Contractor filters (empty = all)
contractors = []

# Cap on assigned documents after sharding (0 = unlimited)
max_documents = 0

# Document families to harvest
include_articles = true
include_determinations = true

# ============================================================================
# Sharding
# ============================================================================
[shard]
# This process's shard (0-based)
index = 0

# Total number of shards
count = 1

# "hash" (stable hash of the document key) or "round_robin" (list position)
strategy = "hash"

# ============================================================================
# Output
# ============================================================================
[output]
# Directory for codes_normalized.csv, document_nocodes.csv, codes_changes.csv
directory = "output"

# Previous snapshot to diff against; missing file = empty change log
# previous_snapshot = "output/previous/codes_normalized.csv"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging
local_enabled = false

# Log directory
local_path = "logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarvestConfig;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "covharvest.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "covharvest.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_are_valid() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: HarvestConfig = toml::from_str(&content).unwrap();
            assert!(config.validate().is_ok());
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("covharvest.toml");
        std::fs::write(&path, "").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
    }
}
