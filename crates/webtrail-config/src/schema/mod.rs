//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_recording;
mod schema_replay;

pub use schema_recording::*;
pub use schema_replay::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// `~/.webtrail/<name>`, falling back to the working directory without a home.
pub(crate) fn webtrail_dir(name: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".webtrail")
        .join(name)
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub recorder: RecorderConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub replay: ReplayConfig,

    #[serde(default)]
    pub relaxation: RelaxationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Browser connection and launch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Persistent profile so logins survive between sessions.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// Explicit Chrome/Chromium executable; auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Per-command CDP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            profile_dir: default_profile_dir(),
            chrome_path: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_profile_dir() -> PathBuf {
    webtrail_dir("browser-profile")
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files; `~/.webtrail/logs` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| webtrail_dir("logs"))
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
