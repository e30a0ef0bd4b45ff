//! Policy executor: one background worker driving every registered policy.
//!
//! The executor owns one [`SchedulingEntry`] per policy. `start` moves the
//! entries into a worker task which is the only place they are mutated.

use std::sync::Arc;
use std::time::Duration;

use remedy_types::Action;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::ExecutorConfig;
use crate::error::{ExecutorError, ExecutorResult, PolicyError};
use crate::events::{ExecutorEvent, PipelineStage};
use crate::policy::HealthPolicy;
use crate::schedule::{next_wait, SchedulingEntry};

/// Drives a fixed set of health policies on a single worker.
pub struct PolicyExecutor {
    /// Configuration.
    config: ExecutorConfig,

    /// Scheduling entries, present until the worker takes them.
    entries: Option<Vec<SchedulingEntry>>,

    /// Number of registered policies.
    policy_count: usize,

    /// Event broadcaster.
    event_tx: broadcast::Sender<ExecutorEvent>,

    /// Handle used to cancel the worker.
    worker: Option<AbortHandle>,
}

impl PolicyExecutor {
    /// Create an executor with the default configuration.
    pub fn new(policies: Vec<Arc<dyn HealthPolicy>>) -> Self {
        Self::with_config(ExecutorConfig::default(), policies)
    }

    /// Create an executor.
    ///
    /// Policies run, and receive actions, in the order given here.
    pub fn with_config(config: ExecutorConfig, policies: Vec<Arc<dyn HealthPolicy>>) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let entries: Vec<SchedulingEntry> = policies.into_iter().map(SchedulingEntry::new).collect();

        Self {
            config,
            policy_count: entries.len(),
            entries: Some(entries),
            event_tx,
            worker: None,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn policy_count(&self) -> usize {
        self.policy_count
    }

    /// Subscribe to executor events.
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutorEvent> {
        self.event_tx.subscribe()
    }

    /// Spawn the worker on the current tokio runtime.
    ///
    /// The returned handle completes only when the worker is stopped. An
    /// executor can be started once.
    pub fn start(&mut self) -> ExecutorResult<JoinHandle<()>> {
        let runtime = Handle::try_current().map_err(|e| ExecutorError::NoRuntime(e.to_string()))?;
        let entries = self.entries.take().ok_or(ExecutorError::AlreadyStarted)?;

        info!(
            policies = entries.len(),
            idle_wait_ms = self.config.idle_wait_ms,
            "Starting policy executor"
        );

        let cycle = PolicyCycle::new(entries, self.config.idle_wait(), self.event_tx.clone());
        let handle = runtime.spawn(cycle.run());
        self.worker = Some(handle.abort_handle());

        Ok(handle)
    }

    /// Cancel the worker without waiting for the current cycle to finish.
    pub fn stop(&self) {
        if let Some(worker) = &self.worker {
            info!("Stopping policy executor");
            worker.abort();
        }
    }

    /// Whether the worker was started and has not terminated yet.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|worker| !worker.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for PolicyExecutor {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.abort();
        }
    }
}

/// A pipeline stage failure for one policy.
#[derive(Debug)]
struct StageFailure {
    stage: PipelineStage,
    error: PolicyError,
}

impl StageFailure {
    fn at(stage: PipelineStage) -> impl FnOnce(PolicyError) -> Self {
        move |error| Self { stage, error }
    }
}

/// The worker's state and loop.
pub(crate) struct PolicyCycle {
    entries: Vec<SchedulingEntry>,
    idle_wait: Duration,
    event_tx: broadcast::Sender<ExecutorEvent>,
}

impl PolicyCycle {
    pub(crate) fn new(
        entries: Vec<SchedulingEntry>,
        idle_wait: Duration,
        event_tx: broadcast::Sender<ExecutorEvent>,
    ) -> Self {
        Self {
            entries,
            idle_wait,
            event_tx,
        }
    }

    /// Run cycles until the task is aborted.
    pub(crate) async fn run(mut self) {
        loop {
            self.run_once().await;
            // Cycles of always-due policies must still let the runtime cancel us.
            tokio::task::yield_now().await;
        }
    }

    /// Wait for the earliest policy, then run every policy that is due.
    pub(crate) async fn run_once(&mut self) {
        let wait = next_wait(&self.entries, Instant::now(), self.idle_wait);
        if !wait.is_zero() {
            debug!(?wait, "Sleeping before next policy execution cycle");
            let _ = self.event_tx.send(ExecutorEvent::CycleWaiting { wait });
            tokio::time::sleep(wait).await;
        }

        for index in 0..self.entries.len() {
            if !self.entries[index].is_due(Instant::now()) {
                continue;
            }

            let policy = Arc::clone(self.entries[index].policy());
            match execute_policy(policy.as_ref()).await {
                Ok(actions) => {
                    self.entries[index].mark_run(Instant::now());

                    if !actions.is_empty() {
                        info!(policy = policy.name(), actions = actions.len(), "Policy produced actions");
                    }
                    let _ = self.event_tx.send(ExecutorEvent::PolicyExecuted {
                        policy: policy.name().to_string(),
                        action_count: actions.len(),
                    });

                    self.broadcast(&actions).await;
                }
                Err(failure) => {
                    // Retried after its interval, like a successful run.
                    self.entries[index].mark_run(Instant::now());
                    warn!(
                        policy = policy.name(),
                        stage = %failure.stage,
                        error = %failure.error,
                        "Policy execution failed, retrying after its interval"
                    );
                    let _ = self.event_tx.send(ExecutorEvent::PolicyFailed {
                        policy: policy.name().to_string(),
                        stage: failure.stage,
                        reason: failure.error.to_string(),
                    });
                }
            }
        }
    }

    /// Deliver each action to every registered policy, in registration order.
    async fn broadcast(&self, actions: &[Action]) {
        for action in actions {
            for entry in &self.entries {
                let policy = entry.policy();
                if let Err(error) = policy.on_action(action).await {
                    warn!(
                        policy = policy.name(),
                        action_id = %action.id,
                        error = %error,
                        "Policy failed to process action"
                    );
                    let _ = self.event_tx.send(ExecutorEvent::NotificationFailed {
                        policy: policy.name().to_string(),
                        action_id: action.id,
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[SchedulingEntry] {
        &self.entries
    }
}

/// Run one policy's pipeline to completion.
#[instrument(skip_all, fields(policy = policy.name()))]
async fn execute_policy(policy: &dyn HealthPolicy) -> Result<Vec<Action>, StageFailure> {
    debug!("Executing policy");

    let symptoms = policy
        .detect()
        .await
        .map_err(StageFailure::at(PipelineStage::Detect))?;
    let diagnoses = policy
        .diagnose(&symptoms)
        .await
        .map_err(StageFailure::at(PipelineStage::Diagnose))?;
    let resolver = policy
        .select_resolver(&diagnoses)
        .await
        .map_err(StageFailure::at(PipelineStage::SelectResolver))?;
    let actions = policy
        .resolve(resolver)
        .await
        .map_err(StageFailure::at(PipelineStage::Resolve))?;

    debug!(
        symptoms = symptoms.len(),
        diagnoses = diagnoses.len(),
        actions = actions.len(),
        "Policy executed"
    );
    Ok(actions)
}
