//! Error types for the resilience and telemetry core.
//!
//! This module defines:
//! - [`TimeoutError`]: a bounded wait expired
//! - [`AttemptError`]: the outcome of a single failed attempt
//! - [`RetryError`]: every configured attempt failed
//! - [`ProbeFailure`]: the closed set of payloads a dependency probe may fail with
//! - [`ConfigError`]: configuration loading and validation errors
//! - [`AppError`]: top-level error for the binary
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Message used when a failure payload carries nothing worth showing.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dependency probe could not be constructed or run.
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeFailure),

    /// Report serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A bounded wait expired before the underlying operation settled.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Timeout after {timeout_ms}ms")]
pub struct TimeoutError {
    /// The configured timeout in milliseconds.
    pub timeout_ms: u64,
}

impl TimeoutError {
    /// Create a timeout error for the given limit.
    #[must_use]
    pub const fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

/// Why a single attempt did not produce a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptError<E> {
    /// The attempt lost its timeout race.
    #[error(transparent)]
    TimedOut(#[from] TimeoutError),

    /// The operation itself failed.
    #[error("{0}")]
    Failed(E),
}

impl<E> AttemptError<E> {
    /// Returns true if the attempt timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

/// All configured attempts were exhausted.
///
/// The last underlying error is chained as the [`std::error::Error::source`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Operation failed after {attempts} attempt(s): {last}")]
pub struct RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of attempts made.
    pub attempts: u32,
    /// The error from the final attempt.
    #[source]
    pub last: AttemptError<E>,
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Returns true if the final attempt timed out.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.last.is_timeout()
    }
}

/// Failure payload produced by a dependency probe.
///
/// Only [`ProbeFailure::Error`] carries a message that is surfaced to callers;
/// bare text and opaque payloads are normalized to [`UNKNOWN_ERROR`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// A structured error with a human-readable message.
    #[error("{message}")]
    Error {
        /// Description of the failure.
        message: String,
    },

    /// A bare string payload with no error structure.
    #[error("Unknown error")]
    Text(String),

    /// Nothing usable was reported.
    #[error("Unknown error")]
    Unknown,
}

impl ProbeFailure {
    /// Build a structured failure from a message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// The caller-facing description of this failure.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Error { message } if !message.is_empty() => message.clone(),
            Self::Error { .. } | Self::Text(_) | Self::Unknown => UNKNOWN_ERROR.to_string(),
        }
    }
}

impl From<reqwest::Error> for ProbeFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::error(err.to_string())
    }
}

impl From<std::io::Error> for ProbeFailure {
    fn from(err: std::io::Error) -> Self {
        Self::error(err.to_string())
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
