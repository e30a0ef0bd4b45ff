//! A health policy assembled from detectors, diagnosers and resolvers.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use remedy_types::{Action, Diagnosis, Symptom};
use tracing::debug;

use super::{Detector, Diagnoser, HealthPolicy, Resolver};
use crate::error::PolicyResult;

/// Chooses a resolver from the registered ones, given the current diagnoses.
pub type ResolverSelector =
    Arc<dyn Fn(&[Arc<dyn Resolver>], &[Diagnosis]) -> Option<Arc<dyn Resolver>> + Send + Sync>;

const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// A [`HealthPolicy`] composed of ordered pipeline stages.
///
/// - every detector runs and their symptoms are concatenated,
/// - every diagnoser sees all symptoms and their diagnoses are concatenated,
/// - with no diagnoses (or no resolvers) no resolver is selected,
/// - otherwise the selector picks one, by default the first registered resolver.
///
/// The diagnoses from the last `diagnose` call are kept for `resolve`.
/// Actions observed through `on_action` are kept in a bounded history.
pub struct PipelinePolicy {
    name: String,
    interval: Duration,
    detectors: Vec<Arc<dyn Detector>>,
    diagnosers: Vec<Arc<dyn Diagnoser>>,
    resolvers: Vec<Arc<dyn Resolver>>,
    selector: ResolverSelector,
    last_diagnoses: Mutex<Vec<Diagnosis>>,
    history: Mutex<VecDeque<Action>>,
    history_capacity: usize,
}

impl PipelinePolicy {
    pub fn builder(name: impl Into<String>, interval: Duration) -> PipelinePolicyBuilder {
        PipelinePolicyBuilder::new(name, interval)
    }

    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    pub fn diagnosers(&self) -> &[Arc<dyn Diagnoser>] {
        &self.diagnosers
    }

    pub fn resolvers(&self) -> &[Arc<dyn Resolver>] {
        &self.resolvers
    }

    /// Diagnoses produced by the most recent `diagnose` call.
    pub fn last_diagnoses(&self) -> Vec<Diagnosis> {
        self.last_diagnoses.lock().clone()
    }

    /// Actions observed most recently, oldest first.
    pub fn recent_actions(&self) -> Vec<Action> {
        self.history.lock().iter().cloned().collect()
    }
}

impl fmt::Debug for PipelinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelinePolicy")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("detectors", &self.detectors.len())
            .field("diagnosers", &self.diagnosers.len())
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

#[async_trait]
impl HealthPolicy for PipelinePolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn detect(&self) -> PolicyResult<Vec<Symptom>> {
        let mut symptoms = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect().await?;
            debug!(policy = %self.name, detector = detector.name(), count = found.len(), "Detector ran");
            symptoms.extend(found);
        }
        Ok(symptoms)
    }

    async fn diagnose(&self, symptoms: &[Symptom]) -> PolicyResult<Vec<Diagnosis>> {
        let mut diagnoses = Vec::new();
        for diagnoser in &self.diagnosers {
            let found = diagnoser.diagnose(symptoms).await?;
            debug!(policy = %self.name, diagnoser = diagnoser.name(), count = found.len(), "Diagnoser ran");
            diagnoses.extend(found);
        }

        *self.last_diagnoses.lock() = diagnoses.clone();
        Ok(diagnoses)
    }

    async fn select_resolver(
        &self,
        diagnoses: &[Diagnosis],
    ) -> PolicyResult<Option<Arc<dyn Resolver>>> {
        if diagnoses.is_empty() || self.resolvers.is_empty() {
            return Ok(None);
        }
        Ok((self.selector)(&self.resolvers, diagnoses))
    }

    async fn resolve(&self, resolver: Option<Arc<dyn Resolver>>) -> PolicyResult<Vec<Action>> {
        let Some(resolver) = resolver else {
            return Ok(Vec::new());
        };

        let diagnoses = self.last_diagnoses();
        let actions = resolver.resolve(&diagnoses).await?;
        debug!(policy = %self.name, resolver = resolver.name(), count = actions.len(), "Resolver ran");
        Ok(actions)
    }

    async fn on_action(&self, action: &Action) -> PolicyResult<()> {
        if self.history_capacity == 0 {
            return Ok(());
        }

        let mut history = self.history.lock();
        while history.len() >= self.history_capacity {
            history.pop_front();
        }
        history.push_back(action.clone());
        Ok(())
    }
}

/// Builder for [`PipelinePolicy`].
pub struct PipelinePolicyBuilder {
    name: String,
    interval: Duration,
    detectors: Vec<Arc<dyn Detector>>,
    diagnosers: Vec<Arc<dyn Diagnoser>>,
    resolvers: Vec<Arc<dyn Resolver>>,
    selector: Option<ResolverSelector>,
    history_capacity: usize,
}

impl PipelinePolicyBuilder {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            detectors: Vec::new(),
            diagnosers: Vec::new(),
            resolvers: Vec::new(),
            selector: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn diagnoser(mut self, diagnoser: Arc<dyn Diagnoser>) -> Self {
        self.diagnosers.push(diagnoser);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Replace the default first-resolver selection.
    pub fn selector(mut self, selector: ResolverSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Number of observed actions to remember. Zero disables the history.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn build(self) -> PipelinePolicy {
        let selector = match self.selector {
            Some(selector) => selector,
            None => first_resolver(),
        };

        PipelinePolicy {
            name: self.name,
            interval: self.interval,
            detectors: self.detectors,
            diagnosers: self.diagnosers,
            resolvers: self.resolvers,
            selector,
            last_diagnoses: Mutex::new(Vec::new()),
            history: Mutex::new(VecDeque::new()),
            history_capacity: self.history_capacity,
        }
    }
}

fn first_resolver() -> ResolverSelector {
    Arc::new(|resolvers: &[Arc<dyn Resolver>], _: &[Diagnosis]| resolvers.first().cloned())
}
