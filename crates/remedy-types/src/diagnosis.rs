//! Diagnoses derived from symptoms.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DiagnosisId, Symptom, SymptomId};

/// A conclusion a diagnoser drew from one or more symptoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Unique diagnosis identifier
    pub id: DiagnosisId,

    /// Diagnosis type, e.g. `path-absent`
    pub kind: String,

    /// When the diagnosis was made
    pub instant: DateTime<Utc>,

    /// Components the diagnosis applies to
    pub assignments: Vec<String>,

    /// Symptoms that support this diagnosis
    #[serde(default)]
    pub symptoms: Vec<SymptomId>,

    /// Diagnoser-specific details
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Diagnosis {
    /// Create a diagnosis made now, with no supporting symptoms recorded.
    pub fn new<I, S>(kind: impl Into<String>, assignments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: DiagnosisId::generate(),
            kind: kind.into(),
            instant: Utc::now(),
            assignments: assignments.into_iter().map(Into::into).collect(),
            symptoms: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create a diagnosis supported by `symptoms`.
    ///
    /// Assignments are the union of the symptoms' assignments, in first-seen
    /// order.
    pub fn from_symptoms(kind: impl Into<String>, symptoms: &[Symptom]) -> Self {
        let mut assignments: Vec<String> = Vec::new();
        for assignment in symptoms.iter().flat_map(|s| s.assignments.iter()) {
            if !assignments.contains(assignment) {
                assignments.push(assignment.clone());
            }
        }

        let mut diagnosis = Self::new(kind, assignments);
        diagnosis.symptoms = symptoms.iter().map(|s| s.id).collect();
        diagnosis
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
