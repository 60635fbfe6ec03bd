//! YAML configuration for jasper-report
//!
//! This crate parses the YAML file that tells the CLI where the engine lives,
//! which defaults to apply to `process` requests, and which named database
//! connections are available.

#![warn(missing_docs)]

pub mod parser;

use indexmap::IndexMap;
use report_executor::ProcessOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Named connection not found
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Engine location and process settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Defaults applied to every `process` request
    #[serde(default)]
    pub defaults: ProcessOptions,

    /// Named database connection profiles
    #[serde(default)]
    pub connections: IndexMap<String, IndexMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: parser::SUPPORTED_VERSION.to_string(),
            engine: EngineSettings::default(),
            defaults: ProcessOptions::default(),
            connections: IndexMap::new(),
        }
    }
}

impl Config {
    /// Look up a named connection profile
    pub fn connection(&self, name: &str) -> Result<&IndexMap<String, String>> {
        self.connections
            .get(name)
            .ok_or_else(|| ConfigError::ConnectionNotFound(name.to_string()))
    }
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Directory holding the engine executable (Unix-like hosts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Run the engine as this user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as: Option<String>,

    /// Kill the engine after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Extra environment for the engine process
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

impl EngineSettings {
    /// The timeout as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
