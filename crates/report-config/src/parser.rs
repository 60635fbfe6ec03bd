//! Configuration parser with environment variable substitution

use crate::{Config, ConfigError, Result};
use regex::Regex;
use report_executor::{ConnectionKey, validate_formats};
use std::path::Path;
use tracing::debug;

/// The only configuration version understood
pub const SUPPORTED_VERSION: &str = "1.0";

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "jasper.yaml";

/// Load configuration.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is used
/// when present and built-in defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => parse_file(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                parse_file(default)
            } else {
                debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Ok(Config::default())
            }
        }
    }
}

/// Parse a YAML configuration file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse YAML configuration from a string
pub fn parse_str(content: &str) -> Result<Config> {
    parse_str_with(content, |name| std::env::var(name).ok())
}

/// Parse YAML configuration, resolving `${VAR}` references through `lookup`
pub fn parse_str_with<F>(content: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let config: Config = serde_yaml::from_str(content)?;
    let config = resolve_env(config, &lookup)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported version: {}, expected {}",
            config.version, SUPPORTED_VERSION
        )));
    }

    if config.engine.timeout == Some(0) {
        return Err(ConfigError::ValidationError(
            "engine.timeout must be greater than zero".to_string(),
        ));
    }

    if let Some(formats) = &config.defaults.format {
        validate_formats(formats)
            .map_err(|e| ConfigError::ValidationError(format!("defaults.format: {}", e)))?;
    }

    let default_connection = config.defaults.db_connection.iter().map(|c| ("defaults", c));
    let profiles = config.connections.iter().map(|(name, c)| (name.as_str(), c));
    for (name, connection) in default_connection.chain(profiles) {
        for key in connection.keys() {
            key.parse::<ConnectionKey>().map_err(|e| {
                ConfigError::ValidationError(format!("connection '{}': {}", name, e))
            })?;
        }
    }

    Ok(())
}

/// Substitute environment variables in a string
///
/// Supports `${VAR}` and `${VAR:-default}`.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    substitute_with(input, &|name: &str| std::env::var(name).ok())
}

/// Substitute `${VAR}` references using `lookup`
pub fn substitute_with<F>(input: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    let mut result = input.to_string();
    let mut missing = Vec::new();

    for cap in re.captures_iter(input) {
        let full_match = &cap[0];
        let var_expr = &cap[1];

        // Handle default values: ${VAR:-default}
        let (var_name, default_value) = match var_expr.find(":-") {
            Some(pos) => (&var_expr[..pos], Some(&var_expr[pos + 2..])),
            None => (var_expr, None),
        };

        match lookup(var_name).or_else(|| default_value.map(String::from)) {
            Some(value) => result = result.replace(full_match, &value),
            None => missing.push(var_name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    Ok(result)
}

fn resolve_env<F>(mut config: Config, lookup: &F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let engine = &mut config.engine;
    if let Some(dir) = &engine.install_dir {
        engine.install_dir = Some(substitute_with(&dir.to_string_lossy(), lookup)?.into());
    }
    if let Some(user) = &engine.run_as {
        engine.run_as = Some(substitute_with(user, lookup)?);
    }
    for value in engine.env.values_mut() {
        *value = substitute_with(value, lookup)?;
    }

    let defaults = &mut config.defaults;
    if let Some(locale) = &defaults.locale {
        defaults.locale = Some(substitute_with(locale, lookup)?);
    }
    for value in defaults.params.iter_mut().flat_map(|p| p.values_mut()) {
        *value = substitute_with(value, lookup)?;
    }
    for value in defaults.db_connection.iter_mut().flat_map(|c| c.values_mut()) {
        *value = substitute_with(value, lookup)?;
    }

    for value in config.connections.values_mut().flat_map(|c| c.values_mut()) {
        *value = substitute_with(value, lookup)?;
    }

    Ok(config)
}
