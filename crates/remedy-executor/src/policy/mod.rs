//! Health policies and their pipeline stages.
//!
//! A [`HealthPolicy`] is the capability set the executor drives. Most policies
//! are assembled from independent [`Detector`]s, [`Diagnoser`]s and
//! [`Resolver`]s using [`PipelinePolicy`], but anything implementing the trait
//! can be scheduled.

mod pipeline;

pub use pipeline::{PipelinePolicy, PipelinePolicyBuilder, ResolverSelector};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use remedy_types::{Action, Diagnosis, Symptom};

use crate::error::PolicyResult;

/// A recurring unit of work with its own interval and a four-step pipeline.
///
/// The executor calls the pipeline operations in order (`detect`, `diagnose`,
/// `select_resolver`, `resolve`) for one policy at a time, and delivers every
/// resulting action to every registered policy through `on_action`.
#[async_trait]
pub trait HealthPolicy: Send + Sync {
    /// Name used in logs and events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Time between two executions of this policy.
    ///
    /// Read once when the policy is registered with an executor.
    fn interval(&self) -> Duration;

    /// Observe the system.
    async fn detect(&self) -> PolicyResult<Vec<Symptom>>;

    /// Derive diagnoses from this execution's symptoms.
    async fn diagnose(&self, symptoms: &[Symptom]) -> PolicyResult<Vec<Diagnosis>>;

    /// Choose how to remediate, or `None` to take no action.
    async fn select_resolver(
        &self,
        diagnoses: &[Diagnosis],
    ) -> PolicyResult<Option<Arc<dyn Resolver>>>;

    /// Run the selected resolver and report what it did.
    async fn resolve(&self, resolver: Option<Arc<dyn Resolver>>) -> PolicyResult<Vec<Action>>;

    /// Observe an action taken by any registered policy, including this one.
    async fn on_action(&self, _action: &Action) -> PolicyResult<()> {
        Ok(())
    }
}

/// Produces symptoms by observing the system.
#[async_trait]
pub trait Detector: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn detect(&self) -> PolicyResult<Vec<Symptom>>;
}

/// Turns symptoms into diagnoses.
#[async_trait]
pub trait Diagnoser: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn diagnose(&self, symptoms: &[Symptom]) -> PolicyResult<Vec<Diagnosis>>;
}

/// Acts on diagnoses and reports the actions taken.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn resolve(&self, diagnoses: &[Diagnosis]) -> PolicyResult<Vec<Action>>;
}
