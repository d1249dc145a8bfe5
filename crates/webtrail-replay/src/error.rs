//! Replay errors.

use thiserror::Error;
use webtrail_protocols::{DriverError, ErrorKind};

use crate::resolution::SearchCriteria;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// No candidate met the threshold.
    #[error("Resolution failed: {message}")]
    Resolution {
        message: String,
        criteria: Box<SearchCriteria>,
    },

    /// The target was found but the operation failed.
    #[error("Action failed: {message}")]
    ActionExecution { message: String, retryable: bool },

    /// Missing template variable or malformed action. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ReplayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution { .. } => ErrorKind::ResolutionFailure,
            Self::ActionExecution { .. } => ErrorKind::ActionExecutionFailure,
            Self::Configuration(_) => ErrorKind::ConfigurationError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Resolution { .. } => true,
            Self::ActionExecution { retryable, .. } => *retryable,
            Self::Configuration(_) => false,
        }
    }

    pub fn criteria(&self) -> Option<&SearchCriteria> {
        match self {
            Self::Resolution { criteria, .. } => Some(criteria),
            _ => None,
        }
    }

    pub(crate) fn execution(message: impl Into<String>) -> Self {
        Self::ActionExecution {
            message: message.into(),
            retryable: true,
        }
    }
}

impl From<DriverError> for ReplayError {
    fn from(err: DriverError) -> Self {
        Self::ActionExecution {
            retryable: !err.is_fatal(),
            message: err.to_string(),
        }
    }
}
