//! Replay outcomes: per-action results and the aggregate execution report.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionType;
use crate::error::ErrorKind;

/// How an action's target was located (or that none was needed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    Selector,
    Text,
    Position,
    Visual,
    /// Executed without element resolution (navigate, wait, scroll).
    Direct,
    /// No method succeeded.
    None,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selector => "selector",
            Self::Text => "text",
            Self::Position => "position",
            Self::Visual => "visual",
            Self::Direct => "direct",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debug evidence captured around one action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<PathBuf>,
}

impl ActionArtifacts {
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.highlight.is_none()
    }
}

/// Outcome of replaying one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub index: usize,
    pub name: String,
    pub action_type: ActionType,
    pub success: bool,
    pub method: ResolutionMethod,
    pub confidence: f64,
    pub retries: u32,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ActionArtifacts>,
}

/// Per-method usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodStat {
    pub count: u32,
    /// Milliseconds spent in actions resolved by this method.
    pub total_time: u64,
}

/// Aggregate statistics over every executed action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
    /// Percentage of successful actions (0-100).
    pub success_rate: f64,
    /// Mean action duration in milliseconds.
    pub average_time: f64,
    /// Mean confidence over successful actions.
    pub average_confidence: f64,
}

impl OverallStats {
    /// Compute statistics from a list of action results.
    pub fn from_results(results: &[ActionResult]) -> Self {
        let total = results.len() as u32;
        let successful = results.iter().filter(|r| r.success).count() as u32;
        let failed = total - successful;
        if total == 0 {
            return Self::default();
        }
        let success_rate = f64::from(successful) / f64::from(total) * 100.0;
        let average_time =
            results.iter().map(|r| r.duration_ms as f64).sum::<f64>() / f64::from(total);
        let average_confidence = if successful == 0 {
            0.0
        } else {
            results
                .iter()
                .filter(|r| r.success)
                .map(|r| r.confidence)
                .sum::<f64>()
                / f64::from(successful)
        };
        Self {
            total,
            successful,
            failed,
            success_rate,
            average_time,
            average_confidence,
        }
    }
}

/// A logged failure with the evidence needed for post-hoc debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    /// Full search criteria used for the final attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Value>,
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            action_index: None,
            action_name: None,
            kind,
            message: message.into(),
            url: None,
            screenshot: None,
            criteria: None,
            attempt: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn for_action(mut self, index: usize, name: impl Into<String>) -> Self {
        self.action_index = Some(index);
        self.action_name = Some(name.into());
        self
    }
}

/// Structured result of replaying one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub workflow_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub actions: Vec<ActionResult>,
    pub method_stats: BTreeMap<String, MethodStat>,
    pub overall_stats: OverallStats,
    pub errors: Vec<ErrorRecord>,
    /// The run was halted by a stop signal or timeout before finishing.
    #[serde(default)]
    pub cancelled: bool,
}

impl ExecutionReport {
    /// Build a report from results, deriving method and overall statistics.
    pub fn from_results(
        workflow_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        actions: Vec<ActionResult>,
        errors: Vec<ErrorRecord>,
        cancelled: bool,
    ) -> Self {
        let mut method_stats: BTreeMap<String, MethodStat> = BTreeMap::new();
        for result in actions.iter().filter(|r| r.success) {
            let stat = method_stats.entry(result.method.to_string()).or_default();
            stat.count += 1;
            stat.total_time += result.duration_ms;
        }
        let overall_stats = OverallStats::from_results(&actions);
        Self {
            workflow_id: workflow_id.into(),
            start_time,
            end_time,
            actions,
            method_stats,
            overall_stats,
            errors,
            cancelled,
        }
    }

    /// Whether every executed action succeeded and the run was not cut short.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.errors.is_empty() && self.overall_stats.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
