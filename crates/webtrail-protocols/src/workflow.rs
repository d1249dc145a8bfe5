//! Persisted workflows: an ordered action sequence plus identity metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Action;

/// An ordered sequence of actions plus identity metadata.
///
/// Immutable once persisted; replay works on a copy of the actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(rename = "type", default = "default_workflow_type")]
    pub workflow_type: String,
    pub actions: Vec<Action>,
}

fn default_workflow_type() -> String {
    "recorded".to_string()
}

impl Workflow {
    /// Create a workflow with a fresh id.
    pub fn new(name: impl Into<String>, platform: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            platform: platform.into(),
            workflow_type: default_workflow_type(),
            actions,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Every distinct template variable referenced by the workflow, in first-use order.
    pub fn required_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.actions.iter().flat_map(|a| a.placeholders()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Serialize to the persisted record format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse the persisted record format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
