//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HarvestConfig;
use crate::domain::errors::HarvestError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into HarvestConfig
/// 4. Applies environment variable overrides (COVHARVEST_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`HarvestError::Configuration`] if the file cannot be read, the
/// TOML is malformed, a referenced environment variable is unset, an
/// override doesn't parse, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use covharvest::config::loader::load_config;
///
/// # fn example() -> covharvest::domain::Result<()> {
/// let config = load_config("covharvest.toml")?;
/// println!("Harvesting from {}", config.api.base_url);
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HarvestConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HarvestError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HarvestError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: HarvestConfig = toml::from_str(&contents)
        .map_err(|e| HarvestError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        HarvestError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads configuration from `path` if it exists, otherwise from defaults
///
/// Environment overrides and validation apply either way, so a scheduled run
/// can be configured entirely through `COVHARVEST_*` variables.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<HarvestConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults and environment"
    );

    let mut config = HarvestConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        HarvestError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HarvestError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(HarvestError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Reads and parses an override variable, if set
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| HarvestError::Configuration(format!("Invalid value for {name}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Splits a comma separated override into trimmed, non-empty values
fn env_list(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Applies environment variable overrides using COVHARVEST_* prefix
///
/// Environment variables follow the pattern: COVHARVEST_<SECTION>_<KEY>
/// For example: COVHARVEST_API_BASE_URL, COVHARVEST_SHARD_INDEX
pub fn apply_env_overrides(config: &mut HarvestConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("COVHARVEST_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // API overrides
    if let Ok(val) = std::env::var("COVHARVEST_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(timeout) = env_parse("COVHARVEST_API_TIMEOUT_SECONDS")? {
        config.api.timeout_seconds = timeout;
    }

    // Query overrides
    if let Some(states) = env_list("COVHARVEST_QUERY_STATES") {
        config.query.states = states;
    }
    if let Ok(val) = std::env::var("COVHARVEST_QUERY_STATUS") {
        let val = val.trim().to_string();
        config.query.status = (!val.is_empty()).then_some(val);
    }
    if let Some(contractors) = env_list("COVHARVEST_QUERY_CONTRACTORS") {
        config.query.contractors = contractors;
    }
    if let Some(max) = env_parse("COVHARVEST_QUERY_MAX_DOCUMENTS")? {
        config.query.max_documents = max;
    }

    // Shard overrides
    if let Some(index) = env_parse("COVHARVEST_SHARD_INDEX")? {
        config.shard.index = index;
    }
    if let Some(count) = env_parse("COVHARVEST_SHARD_COUNT")? {
        config.shard.count = count;
    }
    if let Some(strategy) = env_parse("COVHARVEST_SHARD_STRATEGY")? {
        config.shard.strategy = strategy;
    }

    // Output overrides
    if let Ok(val) = std::env::var("COVHARVEST_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Ok(val) = std::env::var("COVHARVEST_OUTPUT_PREVIOUS_SNAPSHOT") {
        let val = val.trim().to_string();
        config.output.previous_snapshot = (!val.is_empty()).then_some(val);
    }

    // Logging overrides
    if let Some(enabled) = env_parse("COVHARVEST_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("COVHARVEST_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PartitionStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("COVHARVEST_TEST_SUBST_VAR", "CA");
        let input = "states = [\"${COVHARVEST_TEST_SUBST_VAR}\"]";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "states = [\"CA\"]");
        std::env::remove_var("COVHARVEST_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("COVHARVEST_TEST_MISSING_VAR");
        let input = "status = \"${COVHARVEST_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(matches!(result, Err(HarvestError::Configuration(_))));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("COVHARVEST_TEST_COMMENTED_VAR");
        let input = "# status = \"${COVHARVEST_TEST_COMMENTED_VAR}\"\nmax_documents = 5";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-covharvest.toml");
        assert!(matches!(result, Err(HarvestError::Configuration(_))));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default("nonexistent-covharvest.toml").unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[api]
base_url = "https://api.coverage.example.com"

[api.retry]
max_attempts = 3

[query]
states = ["CA"]
status = "A"

[shard]
index = 0
count = 2
strategy = "round_robin"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.api.base_url, "https://api.coverage.example.com");
        assert_eq!(config.api.retry.max_attempts, 3);
        assert_eq!(config.query.status.as_deref(), Some("A"));
        assert_eq!(config.shard.strategy, PartitionStrategy::RoundRobin);
    }

    #[test]
    fn test_load_config_invalid_shard() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[shard]\nindex = 5\ncount = 2\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("shard.index"));
    }

    #[test]
    fn test_env_list_splits_and_trims() {
        std::env::set_var("COVHARVEST_TEST_LIST_VAR", " CA, NY ,,TX ");
        let list = env_list("COVHARVEST_TEST_LIST_VAR").unwrap();
        assert_eq!(list, vec!["CA", "NY", "TX"]);
        std::env::remove_var("COVHARVEST_TEST_LIST_VAR");
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("COVHARVEST_TEST_PARSE_VAR", "many");
        let result: Result<Option<usize>> = env_parse("COVHARVEST_TEST_PARSE_VAR");
        assert!(matches!(result, Err(HarvestError::Configuration(_))));
        std::env::remove_var("COVHARVEST_TEST_PARSE_VAR");
    }
}
