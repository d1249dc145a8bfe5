//! Browser driver errors.

use thiserror::Error;

/// Errors surfaced by a [`crate::BrowserDriver`] implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Page closed")]
    PageClosed,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl DriverError {
    /// Whether the page/session is gone and further calls cannot succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PageClosed | Self::ConnectionFailed(_))
    }
}
