//! # Remedy Executor - Scheduling health policies
//!
//! This crate drives a fixed set of health policies through their
//! detect → diagnose → resolve pipeline, each on its own interval, using a
//! single background worker.
//!
//! ## Key Components
//!
//! - [`PolicyExecutor`]: owns the scheduling entries and the worker
//! - [`HealthPolicy`]: the capability set the executor drives
//! - [`PipelinePolicy`]: a policy assembled from detectors, diagnosers and resolvers
//! - [`ExecutorEvent`]: observability stream of what each cycle did
//!
//! ## Cycle
//!
//! Every cycle the worker:
//!
//! 1. computes the minimum remaining wait across all policies and sleeps that long
//!    (the configured idle wait when there are no policies),
//! 2. runs every due policy, in registration order, through its pipeline,
//! 3. after each policy, delivers each of its actions to every registered policy
//!    (including itself), in registration order.
//!
//! A policy whose pipeline fails is skipped for the rest of the cycle and retried
//! on the next one. A failing notification does not stop delivery to the remaining
//! policies.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use remedy_executor::{HealthPolicy, PipelinePolicy, PolicyExecutor};
//!
//! # async fn example() -> remedy_executor::ExecutorResult<()> {
//! let policy = PipelinePolicy::builder("noop", Duration::from_secs(30)).build();
//! let policies: Vec<Arc<dyn HealthPolicy>> = vec![Arc::new(policy)];
//!
//! let mut executor = PolicyExecutor::new(policies);
//! let _cycle = executor.start()?;
//!
//! // ... later
//! executor.stop();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod policy;
pub mod schedule;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ExecutorConfig;
pub use error::{ExecutorError, ExecutorResult, PolicyError, PolicyResult};
pub use events::{ExecutorEvent, PipelineStage};
pub use executor::PolicyExecutor;
pub use policy::{
    Detector, Diagnoser, HealthPolicy, PipelinePolicy, PipelinePolicyBuilder, Resolver,
    ResolverSelector,
};
pub use schedule::{next_wait, SchedulingEntry};
