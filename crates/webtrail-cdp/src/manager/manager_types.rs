//! Browser manager type definitions and configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use webtrail_config::BrowserConfig;
use webtrail_protocols::DriverError;

use crate::cdp::CdpError;

/// Browser manager errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error(transparent)]
    Cdp(#[from] CdpError),
}

impl From<BrowserError> for DriverError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::Cdp(inner) => inner.into(),
            BrowserError::PageNotFound(_) => DriverError::PageClosed,
            other => DriverError::ConnectionFailed(other.to_string()),
        }
    }
}

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Profile directory for persistent login state.
    pub profile_dir: Option<PathBuf>,
    /// Explicit executable; searched in well-known locations when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Per-command CDP timeout.
    pub request_timeout: Duration,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            viewport_width: 1280,
            viewport_height: 720,
            profile_dir: None,
            chrome_path: None,
            headless: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&BrowserConfig> for BrowserManagerConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            debug_port: config.debug_port,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            profile_dir: Some(config.profile_dir.clone()),
            chrome_path: config.chrome_path.clone(),
            headless: config.headless,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl BrowserManagerConfig {
    /// Get the profile directory, using the default if not specified.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".webtrail")
                .join("browser-profile")
        })
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
