//! Remedy Daemon - runs path-watch health policies until interrupted
//!
//! The daemon provides:
//! - Layered configuration (defaults, file, `REMEDY_*` environment)
//! - Path-watch policies built from configuration
//! - A policy executor running until Ctrl-C

pub mod config;
pub mod error;
pub mod policies;

use std::sync::Arc;

use remedy_executor::{HealthPolicy, PolicyExecutor};
use tracing::info;

use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};

/// Build the configured policies and run them until Ctrl-C.
pub async fn run(config: DaemonConfig) -> DaemonResult<()> {
    let policies: Vec<Arc<dyn HealthPolicy>> = config
        .policies
        .iter()
        .map(|policy| Arc::new(policies::build_path_policy(policy)) as Arc<dyn HealthPolicy>)
        .collect();

    if policies.is_empty() {
        info!("No policies configured, executor will idle");
    }

    let mut executor = PolicyExecutor::with_config(config.executor.clone(), policies);
    let worker = executor.start()?;

    tokio::select! {
        result = worker => {
            // The worker only returns when it was cancelled or panicked.
            result.map_err(|e| DaemonError::Worker(e.to_string()))?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Ctrl-C received, shutting down");
            executor.stop();
        }
    }

    Ok(())
}
