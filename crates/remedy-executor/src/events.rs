//! Events emitted by the executor worker.

use std::fmt;
use std::time::Duration;

use remedy_types::ActionId;

/// A stage of the policy pipeline, or the notification step that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Detect,
    Diagnose,
    SelectResolver,
    Resolve,
    Notify,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Detect => write!(f, "detect"),
            PipelineStage::Diagnose => write!(f, "diagnose"),
            PipelineStage::SelectResolver => write!(f, "select_resolver"),
            PipelineStage::Resolve => write!(f, "resolve"),
            PipelineStage::Notify => write!(f, "notify"),
        }
    }
}

/// Events emitted by the executor.
#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    /// The worker is about to sleep before running due policies.
    CycleWaiting { wait: Duration },

    /// A policy completed its pipeline.
    PolicyExecuted { policy: String, action_count: usize },

    /// A policy's pipeline failed; the policy is retried next cycle.
    PolicyFailed {
        policy: String,
        stage: PipelineStage,
        reason: String,
    },

    /// A policy failed to process a broadcast action.
    NotificationFailed {
        policy: String,
        action_id: ActionId,
        reason: String,
    },
}
