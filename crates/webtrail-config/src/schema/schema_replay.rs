//! Replay and threshold relaxation configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::webtrail_dir;

/// Replay controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Retries after the first attempt of each action.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Abort the run on the first failed action.
    #[serde(default)]
    pub stop_on_error: bool,

    /// Capture before/after screenshots and highlight resolved targets.
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_debug_dir")]
    pub debug_dir: PathBuf,

    /// Evidence screenshots for failed actions.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Overall run timeout; unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            stop_on_error: false,
            debug: false,
            debug_dir: default_debug_dir(),
            artifacts_dir: default_artifacts_dir(),
            timeout_secs: None,
        }
    }
}

impl ReplayConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_debug_dir() -> PathBuf {
    webtrail_dir("debug")
}

fn default_artifacts_dir() -> PathBuf {
    webtrail_dir("failures")
}

/// Per-attempt loosening of resolution thresholds.
///
/// Tolerances are in viewport percent; confidences in `0..=1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationConfig {
    #[serde(default = "default_base_tolerance")]
    pub base_tolerance: f64,

    #[serde(default = "default_tolerance_step")]
    pub tolerance_step: f64,

    #[serde(default = "default_max_tolerance")]
    pub max_tolerance: f64,

    #[serde(default = "default_base_min_confidence")]
    pub base_min_confidence: f64,

    #[serde(default = "default_confidence_step")]
    pub confidence_step: f64,

    #[serde(default = "default_min_confidence_floor")]
    pub min_confidence_floor: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            base_tolerance: default_base_tolerance(),
            tolerance_step: default_tolerance_step(),
            max_tolerance: default_max_tolerance(),
            base_min_confidence: default_base_min_confidence(),
            confidence_step: default_confidence_step(),
            min_confidence_floor: default_min_confidence_floor(),
        }
    }
}

fn default_base_tolerance() -> f64 {
    5.0
}

fn default_tolerance_step() -> f64 {
    7.5
}

fn default_max_tolerance() -> f64 {
    50.0
}

fn default_base_min_confidence() -> f64 {
    0.8
}

fn default_confidence_step() -> f64 {
    0.1
}

fn default_min_confidence_floor() -> f64 {
    0.4
}
