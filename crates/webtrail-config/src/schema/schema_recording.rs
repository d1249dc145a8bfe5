//! Recorder and action compiler configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::{default_true, webtrail_dir};

/// Interaction capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Quiet period after the last keystroke before a typing burst is emitted.
    #[serde(default = "default_typing_debounce_ms")]
    pub typing_debounce_ms: u64,

    /// How often the in-memory event log is mirrored to the backup store.
    #[serde(default = "default_backup_interval_ms")]
    pub backup_interval_ms: u64,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Attach element and context screenshots to descriptors.
    #[serde(default = "default_true")]
    pub capture_screenshots: bool,

    /// Padding around the element in the context screenshot.
    #[serde(default = "default_context_padding_px")]
    pub context_padding_px: f64,

    /// Attempts to re-arm capture after a navigation.
    #[serde(default = "default_injection_retries")]
    pub injection_retries: u32,

    #[serde(default = "default_stability_idle_ms")]
    pub stability_idle_ms: u64,

    #[serde(default = "default_stability_timeout_ms")]
    pub stability_timeout_ms: u64,

    /// A navigation this soon after a click is attributed to the click.
    #[serde(default = "default_navigation_click_window_ms")]
    pub navigation_click_window_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            typing_debounce_ms: default_typing_debounce_ms(),
            backup_interval_ms: default_backup_interval_ms(),
            backup_dir: default_backup_dir(),
            capture_screenshots: true,
            context_padding_px: default_context_padding_px(),
            injection_retries: default_injection_retries(),
            stability_idle_ms: default_stability_idle_ms(),
            stability_timeout_ms: default_stability_timeout_ms(),
            navigation_click_window_ms: default_navigation_click_window_ms(),
        }
    }
}

impl RecorderConfig {
    pub fn typing_debounce(&self) -> Duration {
        Duration::from_millis(self.typing_debounce_ms)
    }

    pub fn backup_interval(&self) -> Duration {
        Duration::from_millis(self.backup_interval_ms)
    }

    pub fn stability_idle(&self) -> Duration {
        Duration::from_millis(self.stability_idle_ms)
    }

    pub fn stability_timeout(&self) -> Duration {
        Duration::from_millis(self.stability_timeout_ms)
    }

    pub fn navigation_click_window(&self) -> Duration {
        Duration::from_millis(self.navigation_click_window_ms)
    }
}

fn default_typing_debounce_ms() -> u64 {
    800
}

fn default_backup_interval_ms() -> u64 {
    2000
}

fn default_backup_dir() -> PathBuf {
    webtrail_dir("backup")
}

fn default_context_padding_px() -> f64 {
    40.0
}

fn default_injection_retries() -> u32 {
    3
}

fn default_stability_idle_ms() -> u64 {
    500
}

fn default_stability_timeout_ms() -> u64 {
    10_000
}

fn default_navigation_click_window_ms() -> u64 {
    1500
}

/// Raw event to Action compilation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Events closer together than this get a synthetic wait between them.
    #[serde(default = "default_wait_gap_ms")]
    pub wait_gap_ms: u64,

    #[serde(default = "default_wait_min_ms")]
    pub wait_min_ms: u64,

    #[serde(default = "default_wait_max_ms")]
    pub wait_max_ms: u64,

    /// `selectorFirst`, `visualFirst` or `visualOnly`.
    #[serde(default = "default_resolution_mode")]
    pub default_resolution_mode: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            wait_gap_ms: default_wait_gap_ms(),
            wait_min_ms: default_wait_min_ms(),
            wait_max_ms: default_wait_max_ms(),
            default_resolution_mode: default_resolution_mode(),
        }
    }
}

fn default_wait_gap_ms() -> u64 {
    2000
}

fn default_wait_min_ms() -> u64 {
    1000
}

fn default_wait_max_ms() -> u64 {
    2000
}

fn default_resolution_mode() -> String {
    "selectorFirst".to_string()
}

/// Resolution mode names accepted by [`CompilerConfig::default_resolution_mode`].
pub const RESOLUTION_MODES: [&str; 3] = ["selectorFirst", "visualFirst", "visualOnly"];
