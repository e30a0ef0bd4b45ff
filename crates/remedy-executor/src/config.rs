//! Executor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`PolicyExecutor`](crate::PolicyExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Wait between cycles when no policies are registered, in milliseconds.
    /// Values below 1 are treated as 1.
    #[serde(default = "default_idle_wait_ms")]
    pub idle_wait_ms: u64,

    /// Capacity of the executor event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            idle_wait_ms: default_idle_wait_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ExecutorConfig {
    /// Idle wait as a duration, never zero.
    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms.max(MIN_IDLE_WAIT_MS))
    }
}

const MIN_IDLE_WAIT_MS: u64 = 1;

fn default_idle_wait_ms() -> u64 {
    1000
}

fn default_event_capacity() -> usize {
    1024
}
