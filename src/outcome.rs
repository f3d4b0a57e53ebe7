//! Result convention shared by every pipeline stage.
//!
//! Stages never hand a structured error to the caller. A failure becomes a
//! [`PipelineResult`] whose text starts with [`WARNING_MARKER`], and every
//! later stage checks for the marker and passes the value through untouched.
//!
//! # Error Categories
//!
//! - Validation: malformed, oversized or empty input
//! - Acquisition: download or extraction failure, empty content
//! - Recognition: speech-to-text failure or unintelligible audio
//! - Model: generative call failure or empty response
//! - Resource: temporary file or directory failure
//! - Cancelled: the caller abandoned the work

use std::fmt;
use thiserror::Error;

/// Leading marker on every failure string.
pub const WARNING_MARKER: &str = "⚠️";

/// Failure category of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Acquisition,
    Recognition,
    Model,
    Resource,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Acquisition => "acquisition",
            ErrorKind::Recognition => "recognition",
            ErrorKind::Model => "model",
            ErrorKind::Resource => "resource",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Internal error value. Converted into a warning [`PipelineResult`] at the
/// stage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn acquisition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Acquisition, message)
    }

    pub fn recognition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Recognition, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Model, message)
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resource, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "Operation cancelled.")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The one value type flowing between stages: a text payload or a
/// warning-marked failure string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineResult(String);

impl PipelineResult {
    /// Wrap a successful payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Render an error as a warning-marked string.
    pub fn warning(error: &PipelineError) -> Self {
        Self(format!("{} {}", WARNING_MARKER, error.message()))
    }

    /// Whether this result is a failure.
    pub fn is_warning(&self) -> bool {
        is_warning(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Feed a successful payload into the next stage; warnings skip it.
    pub fn and_then<F>(self, next: F) -> PipelineResult
    where
        F: FnOnce(&str) -> PipelineResult,
    {
        if self.is_warning() {
            self
        } else {
            next(&self.0)
        }
    }
}

/// Check a raw string for the warning marker.
pub fn is_warning(text: &str) -> bool {
    text.starts_with(WARNING_MARKER)
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PipelineResult {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<PipelineError> for PipelineResult {
    fn from(error: PipelineError) -> Self {
        PipelineResult::warning(&error)
    }
}

impl From<Result<String, PipelineError>> for PipelineResult {
    fn from(result: Result<String, PipelineError>) -> Self {
        match result {
            Ok(text) => PipelineResult::text(text),
            Err(e) => PipelineResult::warning(&e),
        }
    }
}

impl From<PipelineResult> for String {
    fn from(result: PipelineResult) -> Self {
        result.0
    }
}
