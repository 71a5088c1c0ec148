//! Error types for request cycles.

use crate::diag::Diagnostic;
use thiserror::Error;

/// Categories of request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The configuration itself is wrong; fix it and retry
    Configuration,
    /// The transport collaborator failed
    Transport,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Invalid configuration",
            Self::Transport => "Remote call failed",
        }
    }
}

/// Errors that end a request cycle.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization was blocked by recorded error diagnostics
    #[error("configuration has {} error(s)", errors.len())]
    Blocked {
        /// The blocking diagnostics
        errors: Vec<Diagnostic>,
    },

    /// The transport collaborator reported a failure
    #[error("transport error: {message}")]
    Transport {
        /// Message reported by the transport
        message: String,
    },
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Blocked { .. } => ErrorCategory::Configuration,
            Error::Transport { .. } => ErrorCategory::Transport,
        }
    }
}

/// Result type for request cycles.
pub type Result<T> = std::result::Result<T, Error>;
