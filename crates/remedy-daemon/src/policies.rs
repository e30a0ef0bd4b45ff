//! Path-watch policy stages.
//!
//! A path-watch policy reports a `path-missing` symptom for each configured
//! path that does not exist, folds them into one `path-absent` diagnosis, and
//! either reports or recreates the missing paths.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use remedy_executor::{Detector, Diagnoser, PipelinePolicy, PolicyResult, Resolver};
use remedy_types::{Action, Diagnosis, Symptom};
use tracing::{info, warn};

use crate::config::{PathPolicyConfig, Remediation};

pub const PATH_MISSING: &str = "path-missing";
pub const PATH_ABSENT: &str = "path-absent";
pub const PATH_REPORTED: &str = "path-reported";
pub const PATH_CREATED: &str = "path-created";

/// Build the pipeline policy described by `config`.
pub fn build_path_policy(config: &PathPolicyConfig) -> PipelinePolicy {
    let resolver: Arc<dyn Resolver> = match config.remediation {
        Remediation::Report => Arc::new(ReportResolver),
        Remediation::CreateDir => Arc::new(CreateDirResolver),
    };

    PipelinePolicy::builder(config.name.clone(), Duration::from_millis(config.interval_ms))
        .detector(Arc::new(PathExistsDetector::new(config.paths.clone())))
        .diagnoser(Arc::new(MissingPathDiagnoser))
        .resolver(resolver)
        .build()
}

/// Reports each configured path that does not exist.
pub struct PathExistsDetector {
    paths: Vec<PathBuf>,
}

impl PathExistsDetector {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl Detector for PathExistsDetector {
    fn name(&self) -> &str {
        "path-exists"
    }

    async fn detect(&self) -> PolicyResult<Vec<Symptom>> {
        let mut symptoms = Vec::new();
        for path in &self.paths {
            if !tokio::fs::try_exists(path).await? {
                symptoms.push(Symptom::new(PATH_MISSING, [path.display().to_string()]));
            }
        }
        Ok(symptoms)
    }
}

/// Folds all missing-path symptoms into a single diagnosis.
pub struct MissingPathDiagnoser;

#[async_trait]
impl Diagnoser for MissingPathDiagnoser {
    fn name(&self) -> &str {
        "missing-path"
    }

    async fn diagnose(&self, symptoms: &[Symptom]) -> PolicyResult<Vec<Diagnosis>> {
        let missing: Vec<Symptom> = symptoms
            .iter()
            .filter(|s| s.is_kind(PATH_MISSING))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Diagnosis::from_symptoms(PATH_ABSENT, &missing)])
    }
}

/// Logs the missing paths without touching them.
pub struct ReportResolver;

#[async_trait]
impl Resolver for ReportResolver {
    fn name(&self) -> &str {
        "report"
    }

    async fn resolve(&self, diagnoses: &[Diagnosis]) -> PolicyResult<Vec<Action>> {
        let absent: Vec<Diagnosis> = diagnoses
            .iter()
            .filter(|d| d.is_kind(PATH_ABSENT))
            .cloned()
            .collect();

        if absent.is_empty() {
            return Ok(Vec::new());
        }

        let action = Action::for_diagnoses(PATH_REPORTED, &absent);
        warn!(paths = ?action.assignments, "Watched paths are missing");
        Ok(vec![action])
    }
}

/// Creates the missing paths as directories.
pub struct CreateDirResolver;

#[async_trait]
impl Resolver for CreateDirResolver {
    fn name(&self) -> &str {
        "create-dir"
    }

    async fn resolve(&self, diagnoses: &[Diagnosis]) -> PolicyResult<Vec<Action>> {
        let mut actions = Vec::new();
        for diagnosis in diagnoses.iter().filter(|d| d.is_kind(PATH_ABSENT)) {
            for path in &diagnosis.assignments {
                tokio::fs::create_dir_all(path).await?;
                info!(path = %path, "Created missing directory");
            }
            actions.push(Action::for_diagnoses(PATH_CREATED, std::slice::from_ref(diagnosis)));
        }
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_executor::HealthPolicy;

    fn policy_config(paths: Vec<PathBuf>, remediation: Remediation) -> PathPolicyConfig {
        PathPolicyConfig {
            name: "test".to_string(),
            interval_ms: 1000,
            paths,
            remediation,
        }
    }

    #[tokio::test]
    async fn test_detector_reports_only_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present");
        let absent = dir.path().join("absent");
        std::fs::create_dir(&present).unwrap();

        let detector = PathExistsDetector::new(vec![present, absent.clone()]);
        let symptoms = detector.detect().await.unwrap();

        assert_eq!(symptoms.len(), 1);
        assert!(symptoms[0].is_kind(PATH_MISSING));
        assert_eq!(symptoms[0].assignments, vec![absent.display().to_string()]);
    }

    #[tokio::test]
    async fn test_diagnoser_ignores_other_symptoms() {
        let symptoms = vec![Symptom::new("disk-full", ["/"])];
        let diagnoses = MissingPathDiagnoser.diagnose(&symptoms).await.unwrap();
        assert!(diagnoses.is_empty());
    }

    #[tokio::test]
    async fn test_report_policy_produces_report_action() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent");
        let policy = build_path_policy(&policy_config(vec![absent.clone()], Remediation::Report));

        let symptoms = policy.detect().await.unwrap();
        let diagnoses = policy.diagnose(&symptoms).await.unwrap();
        let resolver = policy.select_resolver(&diagnoses).await.unwrap();
        let actions = policy.resolve(resolver).await.unwrap();

        assert_eq!(actions.len(), 1);
        assert!(actions[0].is_kind(PATH_REPORTED));
        assert!(!absent.exists());
    }

    #[tokio::test]
    async fn test_create_dir_policy_creates_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("spool").join("in");
        let policy = build_path_policy(&policy_config(vec![nested.clone()], Remediation::CreateDir));

        let symptoms = policy.detect().await.unwrap();
        let diagnoses = policy.diagnose(&symptoms).await.unwrap();
        let resolver = policy.select_resolver(&diagnoses).await.unwrap();
        let actions = policy.resolve(resolver).await.unwrap();

        assert_eq!(actions.len(), 1);
        assert!(actions[0].is_kind(PATH_CREATED));
        assert!(nested.is_dir());

        // Healthy on the next run: nothing to resolve.
        let symptoms = policy.detect().await.unwrap();
        assert!(symptoms.is_empty());
        let diagnoses = policy.diagnose(&symptoms).await.unwrap();
        assert!(policy.select_resolver(&diagnoses).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_policies_observe_each_others_actions() {
        use remedy_executor::PolicyExecutor;

        let dir = tempfile::tempdir().unwrap();
        let creator = Arc::new(build_path_policy(&PathPolicyConfig {
            name: "creator".to_string(),
            interval_ms: 60_000,
            paths: vec![dir.path().join("made")],
            remediation: Remediation::CreateDir,
        }));
        let watcher = Arc::new(build_path_policy(&policy_config(
            vec![dir.path().to_path_buf()],
            Remediation::Report,
        )));

        let mut executor = PolicyExecutor::new(vec![
            creator.clone() as Arc<dyn HealthPolicy>,
            watcher.clone() as Arc<dyn HealthPolicy>,
        ]);
        let mut events = executor.subscribe();
        let _worker = executor.start().unwrap();

        // One PolicyExecuted event per policy in the first cycle.
        for _ in 0..2 {
            events.recv().await.unwrap();
        }
        executor.stop();

        assert!(dir.path().join("made").is_dir());
        let seen: Vec<_> = watcher.recent_actions().into_iter().map(|a| a.kind).collect();
        assert_eq!(seen, vec![PATH_CREATED.to_string()]);
        assert_eq!(creator.recent_actions().len(), 1);
    }
}
