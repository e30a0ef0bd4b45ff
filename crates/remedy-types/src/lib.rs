//! Remedy Types - Values flowing through a health policy pipeline
//!
//! A health policy runs a four-step pipeline on every execution:
//!
//! - **Detect**: observe the system and report [`Symptom`]s
//! - **Diagnose**: derive [`Diagnosis`]es from the symptoms
//! - **Select resolver**: pick the resolver for those diagnoses, if any
//! - **Resolve**: act on the diagnoses and report the resulting [`Action`]s
//!
//! Every produced action is broadcast back to all registered policies, so a
//! policy can react to remediation performed by its peers.
//!
//! The scheduler never looks inside these values. They exist so that
//! detectors, diagnosers and resolvers written by different people can
//! agree on a shape: a `kind` tag, the instant the value was produced, the
//! assignments (components, hosts, paths...) it concerns, and free-form
//! string attributes.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod action;
pub mod diagnosis;
pub mod ids;
pub mod symptom;

pub use action::Action;
pub use diagnosis::Diagnosis;
pub use ids::{ActionId, DiagnosisId, SymptomId};
pub use symptom::Symptom;
