//! Error types for policies and the executor.

use thiserror::Error;

/// Errors reported by policy pipeline stages and notifications.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A detector could not observe the system
    #[error("Detection failed: {0}")]
    Detection(String),

    /// A diagnoser could not interpret the symptoms
    #[error("Diagnosis failed: {0}")]
    Diagnosis(String),

    /// A resolver could not act on the diagnoses
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// A policy could not process an action notification
    #[error("Notification failed: {0}")]
    Notification(String),

    /// IO error from a stage touching the filesystem or network
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for policy operations.
pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

/// Errors returned synchronously by executor control operations.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// `start` was called on an executor whose worker was already spawned
    #[error("Executor already started")]
    AlreadyStarted,

    /// `start` was called outside a tokio runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),
}

/// Result type for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
