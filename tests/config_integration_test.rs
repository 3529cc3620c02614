//! Integration tests for configuration loading and validation
//!
//! Every test here takes `ENV_MUTEX`: overrides apply to every load, so a
//! test setting `COVHARVEST_*` variables would leak into the others.

use covharvest::config::{load_config, load_config_or_default, PartitionStrategy};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

// Mutex to serialize tests that read or modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDE_VARS: &[&str] = &[
    "COVHARVEST_APPLICATION_LOG_LEVEL",
    "COVHARVEST_API_BASE_URL",
    "COVHARVEST_QUERY_STATES",
    "COVHARVEST_QUERY_MAX_DOCUMENTS",
    "COVHARVEST_SHARD_INDEX",
    "COVHARVEST_SHARD_COUNT",
    "COVHARVEST_SHARD_STRATEGY",
    "COVHARVEST_OUTPUT_DIRECTORY",
    "COVHARVEST_OUTPUT_PREVIOUS_SNAPSHOT",
    "TEST_COVHARVEST_STATUS",
    "TEST_COVHARVEST_SHARD_COUNT",
];

/// Lock the environment and clear every variable these tests touch
fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    for var in OVERRIDE_VARS {
        std::env::remove_var(var);
    }
    guard
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = clean_env();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[api]
base_url = "https://api.coverage.example.com"
user_agent = "covharvest-test"
timeout_seconds = 45
connect_timeout_seconds = 5
token_refresh_after_secs = 1800

[api.retry]
max_attempts = 5
initial_delay_ms = 200
max_delay_ms = 4000
backoff_multiplier = 3.0
jitter = false

[query]
states = ["CA", "NY"]
status = "A"
contractors = ["01112"]
max_documents = 250
include_articles = true
include_determinations = false

[shard]
index = 3
count = 8
strategy = "round_robin"

[output]
directory = "/tmp/covharvest-out"
previous_snapshot = "/tmp/baseline/codes_normalized.csv"

[logging]
local_enabled = false
local_path = "/tmp/covharvest-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");

    assert_eq!(config.api.base_url, "https://api.coverage.example.com");
    assert_eq!(config.api.user_agent, "covharvest-test");
    assert_eq!(config.api.timeout_seconds, 45);
    assert_eq!(config.api.connect_timeout_seconds, 5);
    assert_eq!(config.api.token_refresh_after_secs, 1800);
    assert_eq!(config.api.retry.max_attempts, 5);
    assert_eq!(config.api.retry.max_delay_ms, 4000);
    assert!(!config.api.retry.jitter);

    assert_eq!(config.query.states, vec!["CA", "NY"]);
    assert_eq!(config.query.status.as_deref(), Some("A"));
    assert_eq!(config.query.contractors, vec!["01112"]);
    assert_eq!(config.query.max_documents, 250);
    assert!(!config.query.include_determinations);

    assert_eq!(config.shard.index, 3);
    assert_eq!(config.shard.count, 8);
    assert_eq!(config.shard.strategy, PartitionStrategy::RoundRobin);

    assert_eq!(config.output.directory, "/tmp/covharvest-out");
    assert_eq!(
        config.output.previous_snapshot.as_deref(),
        Some("/tmp/baseline/codes_normalized.csv")
    );

    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_empty_config_with_defaults() {
    let _lock = clean_env();

    let temp_file = write_config("");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.api.base_url, "https://api.coverage.cms.gov");
    assert_eq!(config.api.retry.max_attempts, 4);
    assert!(config.query.states.is_empty());
    assert_eq!(config.query.max_documents, 0);
    assert!(config.query.include_articles);
    assert!(config.query.include_determinations);
    assert_eq!(config.shard.index, 0);
    assert_eq!(config.shard.count, 1);
    assert_eq!(config.shard.strategy, PartitionStrategy::Hash);
    assert!(config.output.previous_snapshot.is_none());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = clean_env();
    std::env::set_var("TEST_COVHARVEST_STATUS", "A");
    std::env::set_var("TEST_COVHARVEST_SHARD_COUNT", "4");

    let temp_file = write_config(
        r#"
[query]
status = "${TEST_COVHARVEST_STATUS}"

[shard]
index = 1
count = ${TEST_COVHARVEST_SHARD_COUNT}
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");
    assert_eq!(config.query.status.as_deref(), Some("A"));
    assert_eq!(config.shard.count, 4);

    std::env::remove_var("TEST_COVHARVEST_STATUS");
    std::env::remove_var("TEST_COVHARVEST_SHARD_COUNT");
}

#[test]
fn test_env_var_overrides() {
    let _lock = clean_env();
    std::env::set_var("COVHARVEST_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("COVHARVEST_QUERY_STATES", "TX, FL");
    std::env::set_var("COVHARVEST_SHARD_INDEX", "2");
    std::env::set_var("COVHARVEST_SHARD_COUNT", "3");
    std::env::set_var("COVHARVEST_SHARD_STRATEGY", "round-robin");

    let temp_file = write_config(
        r#"
[application]
log_level = "info"

[query]
states = ["CA"]

[shard]
index = 0
count = 1
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.query.states, vec!["TX", "FL"]);
    assert_eq!(config.shard.index, 2);
    assert_eq!(config.shard.count, 3);
    assert_eq!(config.shard.strategy, PartitionStrategy::RoundRobin);

    for var in OVERRIDE_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_overrides_apply_without_config_file() {
    let _lock = clean_env();
    std::env::set_var("COVHARVEST_OUTPUT_DIRECTORY", "/tmp/env-only");
    std::env::set_var("COVHARVEST_QUERY_MAX_DOCUMENTS", "10");

    let config = load_config_or_default("does-not-exist-covharvest.toml")
        .expect("Failed to build config from environment");

    assert_eq!(config.output.directory, "/tmp/env-only");
    assert_eq!(config.query.max_documents, 10);

    std::env::remove_var("COVHARVEST_OUTPUT_DIRECTORY");
    std::env::remove_var("COVHARVEST_QUERY_MAX_DOCUMENTS");
}

#[test]
fn test_override_out_of_range_shard_fails_validation() {
    let _lock = clean_env();
    std::env::set_var("COVHARVEST_SHARD_INDEX", "4");
    std::env::set_var("COVHARVEST_SHARD_COUNT", "4");

    let result = load_config_or_default("does-not-exist-covharvest.toml");
    let err = result.unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("shard.index"));

    std::env::remove_var("COVHARVEST_SHARD_INDEX");
    std::env::remove_var("COVHARVEST_SHARD_COUNT");
}

#[test]
fn test_unparseable_override_is_configuration_error() {
    let _lock = clean_env();
    std::env::set_var("COVHARVEST_SHARD_COUNT", "many");

    let err = load_config_or_default("does-not-exist-covharvest.toml").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("COVHARVEST_SHARD_COUNT"));

    std::env::remove_var("COVHARVEST_SHARD_COUNT");
}

#[test]
fn test_invalid_config_validation() {
    let _lock = clean_env();

    let temp_file = write_config(
        r#"
[application]
log_level = "invalid_level"
"#,
    );
    assert!(load_config(temp_file.path()).is_err());

    let temp_file = write_config(
        r#"
[api]
base_url = "ftp://api.coverage.example.com"
"#,
    );
    assert!(load_config(temp_file.path()).is_err());

    let temp_file = write_config(
        r#"
[query]
include_articles = false
include_determinations = false
"#,
    );
    assert!(load_config(temp_file.path()).is_err());
}
