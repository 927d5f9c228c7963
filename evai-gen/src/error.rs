//! Error types for evai-gen
//!
//! Every failure crossing a component boundary is classified by [`ErrorKind`],
//! which decides whether it is retried and how it is reported in a
//! partial-success result.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure classification shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Attempt or deadline elapsed
    Timeout,
    /// Upstream asked us to slow down
    RateLimited,
    /// Caller-supplied input rejected; never retried
    InvalidInput,
    /// Upstream error or unusable upstream output
    UpstreamFailure,
    /// Deployment problem, e.g. a missing policy entry
    ConfigurationError,
}

impl ErrorKind {
    /// Whether a backend call failing with this kind may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::RateLimited)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UpstreamFailure => "upstream_failure",
            ErrorKind::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of one backend operation
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: ErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamFailure, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            408 | 504 => ErrorKind::Timeout,
            429 => ErrorKind::RateLimited,
            400 | 413 | 415 | 422 => ErrorKind::InvalidInput,
            _ => ErrorKind::UpstreamFailure,
        };
        let snippet: String = body.chars().take(200).collect();
        Self::new(kind, format!("HTTP {}: {}", status, snippet))
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::timeout(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::from_status(status.as_u16(), &err.to_string())
        } else {
            BackendError::upstream(err.to_string())
        }
    }
}

/// LLM output that could not be turned into a structured value
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing or empty field: {0}")]
    MissingField(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// Errors that abort a whole variant generation request
///
/// Per-category failures are never surfaced here; they are reported inside
/// the `GenerationReport`.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::InvalidInput(_) => ErrorKind::InvalidInput,
            OrchestratorError::Configuration(_) => ErrorKind::ConfigurationError,
        }
    }
}

/// Fatal failures of the speech assessment pipeline
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Transcription failed: {0}")]
    Transcription(BackendError),

    #[error("Scoring failed: {0}")]
    Scoring(BackendError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AssessmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssessmentError::Transcription(e) | AssessmentError::Scoring(e) => e.kind,
            AssessmentError::Configuration(_) => ErrorKind::ConfigurationError,
        }
    }
}

/// Audio store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey(msg) => BackendError::invalid_input(msg),
            StoreError::Io(e) => BackendError::upstream(format!("audio store: {}", e)),
        }
    }
}
