//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the covharvest configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after applying environment overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  API: {}", config.api.base_url);
        println!("  Timeout: {}s", config.api.timeout_seconds);
        println!(
            "  Retries: {} attempts, {}-{}ms",
            config.api.retry.max_attempts, config.api.retry.initial_delay_ms, config.api.retry.max_delay_ms
        );
        println!(
            "  States: {}",
            if config.query.states.is_empty() {
                "All".to_string()
            } else {
                config.query.states.join(", ")
            }
        );
        println!(
            "  Families: {}{}",
            if config.query.include_articles { "Article " } else { "" },
            if config.query.include_determinations { "LCD" } else { "" }
        );
        println!(
            "  Shard: {} of {} ({})",
            config.shard.index, config.shard.count, config.shard.strategy
        );
        println!("  Output: {}", config.output.directory);
        if let Some(previous) = &config.output.previous_snapshot {
            println!("  Previous snapshot: {previous}");
        }
        println!();
        Ok(0)
    }
}
