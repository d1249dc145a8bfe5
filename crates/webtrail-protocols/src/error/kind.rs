//! Serializable failure taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Failure category recorded in reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// A descriptor could not be extracted; the recorder skips the action.
    CaptureFailure,
    /// The capture script could not attach after a navigation.
    InjectionFailure,
    /// No candidate met the threshold after every retry.
    ResolutionFailure,
    /// The element was found but the operation itself failed.
    ActionExecutionFailure,
    /// A required template variable is missing. Never retried.
    ConfigurationError,
}

impl ErrorKind {
    /// Whether the replay controller may retry an attempt that failed this way.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResolutionFailure | Self::ActionExecutionFailure)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CaptureFailure => "captureFailure",
            Self::InjectionFailure => "injectionFailure",
            Self::ResolutionFailure => "resolutionFailure",
            Self::ActionExecutionFailure => "actionExecutionFailure",
            Self::ConfigurationError => "configurationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
