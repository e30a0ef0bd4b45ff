//! Error types for the daemon

use remedy_executor::ExecutorError;
use thiserror::Error;

/// Daemon error type
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Executor could not be started
    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),

    /// Executor worker terminated unexpectedly
    #[error("Executor worker terminated: {0}")]
    Worker(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<::config::ConfigError> for DaemonError {
    fn from(err: ::config::ConfigError) -> Self {
        DaemonError::Config(err.to_string())
    }
}

/// Result type for daemon operations
pub type DaemonResult<T> = std::result::Result<T, DaemonError>;
