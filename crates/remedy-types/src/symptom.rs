//! Symptoms reported by detectors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SymptomId;

/// An observation produced by a policy's detection stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    /// Unique symptom identifier
    pub id: SymptomId,

    /// Symptom type, e.g. `path-missing` or `backpressure`
    pub kind: String,

    /// When the symptom was observed
    pub instant: DateTime<Utc>,

    /// Components the symptom was observed on
    pub assignments: Vec<String>,

    /// Detector-specific details
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Symptom {
    /// Create a symptom observed now.
    pub fn new<I, S>(kind: impl Into<String>, assignments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: SymptomId::generate(),
            kind: kind.into(),
            instant: Utc::now(),
            assignments: assignments.into_iter().map(Into::into).collect(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a detail to the symptom.
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
