//! Recording policies shared by the executor tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use remedy_types::{Action, Diagnosis, Symptom};

use crate::error::{PolicyError, PolicyResult};
use crate::events::PipelineStage;
use crate::policy::{HealthPolicy, Resolver};

/// Ordered record of every call made on any policy sharing the log.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }
}

struct NamedResolver;

#[async_trait]
impl Resolver for NamedResolver {
    async fn resolve(&self, _diagnoses: &[Diagnosis]) -> PolicyResult<Vec<Action>> {
        Ok(Vec::new())
    }
}

/// Policy that logs `<name>:<call>` for every call and resolves to a fixed
/// list of actions.
pub(crate) struct RecordingPolicy {
    name: String,
    interval: Duration,
    log: CallLog,
    actions: Vec<String>,
    fail_at: Option<PipelineStage>,
}

impl RecordingPolicy {
    pub(crate) fn new(name: &str, interval: Duration, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            interval,
            log: log.clone(),
            actions: Vec::new(),
            fail_at: None,
        }
    }

    /// Kinds of the actions produced on every resolve.
    pub(crate) fn producing(mut self, kinds: &[&str]) -> Self {
        self.actions = kinds.iter().map(|k| k.to_string()).collect();
        self
    }

    pub(crate) fn failing_at(mut self, stage: PipelineStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    fn record(&self, call: &str, stage: PipelineStage) -> PolicyResult<()> {
        self.log.push(format!("{}:{}", self.name, call));
        if self.fail_at == Some(stage) {
            let reason = format!("{} failed at {}", self.name, stage);
            return Err(match stage {
                PipelineStage::Detect => PolicyError::Detection(reason),
                PipelineStage::Diagnose => PolicyError::Diagnosis(reason),
                PipelineStage::SelectResolver => PolicyError::Internal(reason),
                PipelineStage::Resolve => PolicyError::Resolution(reason),
                PipelineStage::Notify => PolicyError::Notification(reason),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HealthPolicy for RecordingPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn detect(&self) -> PolicyResult<Vec<Symptom>> {
        self.record("detect", PipelineStage::Detect)?;
        Ok(vec![Symptom::new("observed", [self.name.as_str()])])
    }

    async fn diagnose(&self, symptoms: &[Symptom]) -> PolicyResult<Vec<Diagnosis>> {
        self.record("diagnose", PipelineStage::Diagnose)?;
        Ok(vec![Diagnosis::from_symptoms("diagnosed", symptoms)])
    }

    async fn select_resolver(
        &self,
        _diagnoses: &[Diagnosis],
    ) -> PolicyResult<Option<Arc<dyn Resolver>>> {
        self.record("select", PipelineStage::SelectResolver)?;
        Ok(Some(Arc::new(NamedResolver)))
    }

    async fn resolve(&self, resolver: Option<Arc<dyn Resolver>>) -> PolicyResult<Vec<Action>> {
        self.record("resolve", PipelineStage::Resolve)?;
        assert!(resolver.is_some(), "selected resolver must be passed back");
        Ok(self
            .actions
            .iter()
            .map(|kind| Action::new(kind.as_str(), [self.name.as_str()]))
            .collect())
    }

    async fn on_action(&self, action: &Action) -> PolicyResult<()> {
        self.record(&format!("on_action:{}", action.kind), PipelineStage::Notify)
    }
}
