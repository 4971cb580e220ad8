//! Error types for the feedback mini-app client.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors from the backend HTTP collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered but refused the request (non-2xx or `ok: false`).
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("Request to {path} failed: {reason}")]
    RequestFailed { path: String, reason: String },

    #[error("Request to {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    #[error("Invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Machine-readable rejection code, if the backend sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Submission validation failures. All are recoverable and shown inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("target required")]
    TargetRequired,

    #[error("target not ratable: {reason}")]
    TargetNotRatable { reason: String },

    #[error("incomplete: {missing} question(s) left")]
    Incomplete { missing: usize },
}
