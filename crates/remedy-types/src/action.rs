//! Actions reported by resolvers.
//!
//! An action records remediation that already happened (or was deliberately
//! only reported). Actions are broadcast to every registered policy after the
//! producing policy's resolve stage completes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActionId, Diagnosis, DiagnosisId};

/// An executed remediation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Unique action identifier
    pub id: ActionId,

    /// Action type, e.g. `path-created`
    pub kind: String,

    /// When the action was taken
    pub instant: DateTime<Utc>,

    /// Components the action touched
    pub assignments: Vec<String>,

    /// Diagnoses this action addressed
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisId>,

    /// Resolver-specific details
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Action {
    pub fn new<I, S>(kind: impl Into<String>, assignments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: ActionId::generate(),
            kind: kind.into(),
            instant: Utc::now(),
            assignments: assignments.into_iter().map(Into::into).collect(),
            diagnoses: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create an action addressing `diagnoses`, touching all their
    /// assignments.
    pub fn for_diagnoses(kind: impl Into<String>, diagnoses: &[Diagnosis]) -> Self {
        let mut assignments: Vec<String> = Vec::new();
        for assignment in diagnoses.iter().flat_map(|d| d.assignments.iter()) {
            if !assignments.contains(assignment) {
                assignments.push(assignment.clone());
            }
        }

        let mut action = Self::new(kind, assignments);
        action.diagnoses = diagnoses.iter().map(|d| d.id).collect();
        action
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_diagnoses() {
        let d1 = Diagnosis::new("path-absent", ["/a"]);
        let d2 = Diagnosis::new("path-absent", ["/a", "/b"]);

        let action = Action::for_diagnoses("path-created", &[d1.clone(), d2.clone()])
            .with_attribute("mode", "create-dir");

        assert!(action.is_kind("path-created"));
        assert_eq!(action.assignments, vec!["/a", "/b"]);
        assert_eq!(action.diagnoses, vec![d1.id, d2.id]);
        assert_eq!(action.attribute("mode"), Some("create-dir"));
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::new("path-reported", ["/srv/data"]).with_attribute("reason", "absent");
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("path-reported"));

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
