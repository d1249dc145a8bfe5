//! Per-attempt threshold relaxation.

use serde::{Deserialize, Serialize};
use webtrail_config::RelaxationConfig;

/// Acceptance thresholds for one resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Position tolerance in viewport percent.
    pub tolerance: f64,
    /// Minimum accepted candidate confidence.
    pub min_confidence: f64,
}

/// Linear relaxation: each retry widens the tolerance by a step and lowers
/// the minimum confidence by a step, within fixed bounds.
///
/// The curve is a tunable policy. Its only guarantee is monotonicity: the
/// thresholds for attempt `k + 1` are never stricter than for attempt `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationPolicy {
    base_tolerance: f64,
    tolerance_step: f64,
    max_tolerance: f64,
    base_min_confidence: f64,
    confidence_step: f64,
    min_confidence_floor: f64,
}

impl RelaxationPolicy {
    pub fn new(config: &RelaxationConfig) -> Self {
        let base_tolerance = config.base_tolerance.max(0.0);
        let base_min_confidence = config.base_min_confidence.clamp(0.0, 1.0);
        Self {
            base_tolerance,
            tolerance_step: config.tolerance_step.max(0.0),
            max_tolerance: config.max_tolerance.max(base_tolerance),
            base_min_confidence,
            confidence_step: config.confidence_step.max(0.0),
            min_confidence_floor: config.min_confidence_floor.clamp(0.0, base_min_confidence),
        }
    }

    /// Thresholds for `attempt` (0 = first try).
    pub fn at(&self, attempt: u32) -> Thresholds {
        let k = f64::from(attempt);
        Thresholds {
            tolerance: (self.base_tolerance + self.tolerance_step * k).min(self.max_tolerance),
            min_confidence: (self.base_min_confidence - self.confidence_step * k)
                .max(self.min_confidence_floor),
        }
    }
}

impl Default for RelaxationPolicy {
    fn default() -> Self {
        Self::new(&RelaxationConfig::default())
    }
}
