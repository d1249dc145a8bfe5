//! Recorder errors.

use thiserror::Error;
use webtrail_protocols::{DriverError, ErrorKind};

use crate::recorder::RecorderState;

#[derive(Debug, Error)]
pub enum RecorderError {
    /// A descriptor could not be extracted from the target element.
    #[error("Capture failed: {0}")]
    CaptureFailure(String),

    /// The capture script could not be attached to the page.
    #[error("Capture script injection failed: {0}")]
    InjectionFailure(String),

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: RecorderState,
    },

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RecorderError {
    /// Taxonomy tag for capture-side failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::CaptureFailure(_) => Some(ErrorKind::CaptureFailure),
            Self::InjectionFailure(_) => Some(ErrorKind::InjectionFailure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_display() {
        let err = RecorderError::InvalidState {
            action: "start",
            state: RecorderState::Stopped,
        };
        assert_eq!(err.to_string(), "Cannot start while stopped");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            RecorderError::CaptureFailure("zero size".into()).kind(),
            Some(ErrorKind::CaptureFailure)
        );
        assert_eq!(
            RecorderError::InjectionFailure("csp".into()).kind(),
            Some(ErrorKind::InjectionFailure)
        );
        assert_eq!(RecorderError::Backup("disk".into()).kind(), None);
    }
}
