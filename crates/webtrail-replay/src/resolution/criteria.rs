//! Search criteria: everything a resolution attempt looked for and found.

use serde::{Deserialize, Serialize};
use webtrail_protocols::{
    Action, BoundingBox, Candidate, Point, ResolutionMethod, ResolutionMode,
};

use crate::relaxation::Thresholds;

/// What one strategy produced during an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub strategy: ResolutionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Full search criteria for one attempt, attached to failures for debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub action: String,
    pub mode: ResolutionMode,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Recorded position in viewport percent.
    #[serde(default)]
    pub relative_position: Option<Point>,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    pub thresholds: Thresholds,
    pub tiers: Vec<Vec<ResolutionMethod>>,
    #[serde(default)]
    pub outcomes: Vec<StrategyOutcome>,
}

impl SearchCriteria {
    pub fn new(action: &Action, thresholds: Thresholds) -> Self {
        let visual = action.visual.as_ref();
        let text = visual
            .map(|v| v.text.trim())
            .filter(|t| !t.is_empty())
            .or_else(|| visual.and_then(|v| v.placeholder.as_deref()))
            .map(str::to_string);
        Self {
            action: action.name.clone(),
            mode: action.resolution_mode,
            selector: action.backup_selector.clone().filter(|s| !s.trim().is_empty()),
            text,
            tag: visual.and_then(|v| v.tag.clone()),
            relative_position: visual.and_then(|v| v.relative_point()),
            bounding_box: visual.and_then(|v| v.bounding_box),
            thresholds,
            tiers: super::strategy_tiers(action.resolution_mode)
                .iter()
                .map(|tier| tier.to_vec())
                .collect(),
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, strategy: ResolutionMethod, found: Option<&Candidate>, note: Option<String>) {
        self.outcomes.push(StrategyOutcome {
            strategy,
            element: found.map(|c| c.element.handle.to_string()),
            confidence: found.map(|c| c.confidence),
            note,
        });
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
