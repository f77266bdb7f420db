//! Binding configuration

use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding a JSON-encoded [`BindingConfig`]
pub const CONFIG_ENV_VAR: &str = "NODE_API_CONFIG";

/// Configuration for the binding as a whole
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BindingConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Configuration for log output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum level to emit (`error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default = "default_level")]
    pub level: String,

    /// Whether to write log lines to stderr
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Log every boundary crossing at debug level
    #[serde(default = "default_false")]
    pub verbose: bool,
}

/// Configuration for the threads that run asynchronous work
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// Stack size in bytes; platform default when unset
    #[serde(default)]
    pub stack_size: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_level() -> String {
    "info".to_string()
}

fn default_thread_name() -> String {
    "node-api-worker".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            console_output: true,
            verbose: false,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            stack_size: None,
        }
    }
}

impl LoggingConfig {
    /// Effective level filter
    pub fn level_filter(&self) -> Result<LevelFilter> {
        if !self.enabled {
            return Ok(LevelFilter::Off);
        }
        if self.verbose {
            return Ok(LevelFilter::Debug);
        }
        LevelFilter::from_str(&self.level)
            .map_err(|_| Error::Config(format!("unknown log level: {}", self.level)))
    }
}

impl BindingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from [`CONFIG_ENV_VAR`], falling back to defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(json) => Self::from_json(&json),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(err) => Err(Error::Config(format!("{}: {}", CONFIG_ENV_VAR, err))),
        }
    }
}
