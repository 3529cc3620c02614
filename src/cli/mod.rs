//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for covharvest using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// covharvest - coverage-policy code table harvester
#[derive(Parser, Debug)]
#[command(name = "covharvest")]
#[command(version, about, long_about = None)]
#[command(author = "Covharvest Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "covharvest.toml", env = "COVHARVEST_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COVHARVEST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harvest one shard and write the output tables
    Harvest(commands::harvest::HarvestArgs),

    /// Compare two normalized snapshots
    Diff(commands::diff::DiffArgs),

    /// Combine shard outputs into single tables
    Merge(commands::merge::MergeArgs),

    /// Resolve one document across every applicable row family
    Probe(commands::probe::ProbeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
