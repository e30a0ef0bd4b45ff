//! Configuration for remedyd

use std::path::PathBuf;

use remedy_executor::ExecutorConfig;
use serde::{Deserialize, Serialize};

use crate::error::DaemonResult;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Path-watch policies, in execution order
    #[serde(default)]
    pub policies: Vec<PathPolicyConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// A policy watching that a set of paths exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPolicyConfig {
    /// Policy name used in logs
    pub name: String,

    /// Execution interval in milliseconds
    #[serde(default = "default_policy_interval")]
    pub interval_ms: u64,

    /// Paths that must exist
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// What to do about missing paths
    #[serde(default)]
    pub remediation: Remediation,
}

/// Remediation for missing paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Remediation {
    /// Only report the missing paths
    #[default]
    Report,

    /// Create the missing paths as directories
    CreateDir,
}

// Default value helpers
fn default_log_level() -> String {
    "info".to_string()
}

fn default_policy_interval() -> u64 {
    30_000
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and `REMEDY_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `REMEDY_EXECUTOR__IDLE_WAIT_MS`.
    pub fn load(path: Option<&str>) -> DaemonResult<Self> {
        let mut builder = ::config::Config::builder();

        builder = builder.add_source(::config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("REMEDY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}
