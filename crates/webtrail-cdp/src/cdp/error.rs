//! CDP error types.

use thiserror::Error;
use webtrail_protocols::DriverError;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::NavigationFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for DriverError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) | CdpError::ChromeNotAvailable(msg) => {
                DriverError::ConnectionFailed(msg)
            }
            CdpError::WebSocket(msg) => DriverError::ConnectionFailed(msg),
            CdpError::SessionClosed => DriverError::PageClosed,
            CdpError::NavigationFailed(msg) => DriverError::NavigationFailed(msg),
            CdpError::ElementNotFound(msg) => DriverError::ElementNotFound(msg),
            CdpError::JavaScript(msg) => DriverError::Script(msg),
            CdpError::Timeout(msg) => DriverError::Timeout(msg),
            other => DriverError::ActionFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_closed_maps_to_page_closed() {
        let err: DriverError = CdpError::SessionClosed.into();
        assert!(matches!(err, DriverError::PageClosed));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_protocol_error_maps_to_action_failed() {
        let err: DriverError = CdpError::Protocol {
            code: -32000,
            message: "Could not compute box model.".to_string(),
        }
        .into();
        assert!(matches!(err, DriverError::ActionFailed(ref m) if m.contains("box model")));
    }

    #[test]
    fn test_invalid_url_maps_to_navigation_failed() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: DriverError = CdpError::from(parse_err).into();
        assert!(matches!(err, DriverError::NavigationFailed(_)));
    }
}
