//! Configuration schema types
//!
//! This module defines the configuration structure for covharvest. Every
//! section has defaults so a run can be configured from environment
//! variables alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default coverage API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.coverage.cms.gov";

/// Shard assignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Stable hash of the canonical document key
    #[default]
    Hash,
    /// Position in the discovered list
    RoundRobin,
}

impl PartitionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionStrategy::Hash => "hash",
            PartitionStrategy::RoundRobin => "round_robin",
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hash" => Ok(PartitionStrategy::Hash),
            "round_robin" | "position" => Ok(PartitionStrategy::RoundRobin),
            other => Err(format!(
                "Invalid shard strategy '{other}'. Must be one of: hash, round_robin"
            )),
        }
    }
}

/// Main covharvest configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Coverage API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Document discovery filters
    #[serde(default)]
    pub query: QueryConfig,

    /// Horizontal sharding
    #[serde(default)]
    pub shard: ShardConfig,

    /// Output tables
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HarvestConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.query.validate()?;
        self.shard.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Retry configuration for transient transport failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Randomize each delay within [delay/2, delay]
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err("api.retry.max_attempts must be between 1 and 10".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("api.retry.initial_delay_ms must not exceed max_delay_ms".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("api.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        Ok(())
    }
}

/// Coverage API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the coverage API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Re-acknowledge the license once the token is this old (seconds)
    #[serde(default = "default_token_refresh_after_secs")]
    pub token_refresh_after_secs: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            token_refresh_after_secs: default_token_refresh_after_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid api.base_url '{}': {e}", self.base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "api.base_url must use http or https, got '{}'",
                parsed.scheme()
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be > 0".to_string());
        }

        if self.token_refresh_after_secs == 0 {
            return Err("api.token_refresh_after_secs must be > 0".to_string());
        }

        self.retry.validate()
    }
}

/// Document discovery filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// State filters passed to the report endpoints (empty = all)
    #[serde(default)]
    pub states: Vec<String>,

    /// Document status filter (e.g. "A" for active)
    #[serde(default)]
    pub status: Option<String>,

    /// Contractor filters (empty = all)
    #[serde(default)]
    pub contractors: Vec<String>,

    /// Cap on documents processed per shard after partitioning (0 = unlimited)
    #[serde(default)]
    pub max_documents: usize,

    /// List Articles
    #[serde(default = "default_true")]
    pub include_articles: bool,

    /// List Determinations
    #[serde(default = "default_true")]
    pub include_determinations: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            status: None,
            contractors: Vec::new(),
            max_documents: 0,
            include_articles: true,
            include_determinations: true,
        }
    }
}

impl QueryConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.include_articles && !self.include_determinations {
            return Err(
                "query.include_articles and query.include_determinations cannot both be false"
                    .to_string(),
            );
        }
        if self.states.iter().any(|s| s.trim().is_empty()) {
            return Err("query.states cannot contain empty values".to_string());
        }
        if self.contractors.iter().any(|c| c.trim().is_empty()) {
            return Err("query.contractors cannot contain empty values".to_string());
        }
        Ok(())
    }
}

/// Shard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardConfig {
    /// Zero-based shard index
    #[serde(default)]
    pub index: usize,

    /// Number of shards (1 = no sharding)
    #[serde(default = "default_shard_count")]
    pub count: usize,

    /// Assignment strategy
    #[serde(default)]
    pub strategy: PartitionStrategy,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            index: 0,
            count: default_shard_count(),
            strategy: PartitionStrategy::default(),
        }
    }
}

impl ShardConfig {
    fn validate(&self) -> Result<(), String> {
        if self.count == 0 {
            return Err("shard.count must be >= 1".to_string());
        }
        if self.count > 1 && self.index >= self.count {
            return Err(format!(
                "shard.index {} is out of range for shard.count {}",
                self.index, self.count
            ));
        }
        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the tables are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Previous normalized snapshot to diff against
    #[serde(default)]
    pub previous_snapshot: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            previous_snapshot: None,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("covharvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

// one-hour token TTL minus a five-minute skew
fn default_token_refresh_after_secs() -> u64 {
    3300
}

fn default_max_attempts() -> usize {
    4
}

fn default_initial_delay_ms() -> u64 {
    750
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_shard_count() -> usize {
    1
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
