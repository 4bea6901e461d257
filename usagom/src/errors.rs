use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by usagom fields and schemas.
#[derive(Debug, Error)]
pub enum UsageError {
    /// Constraint synthesis ran on a descriptor without a result type.
    #[error("field '{field}' has no result type")]
    MissingResultType { field: String },

    /// The usage factory rejected a usage string.
    #[error(transparent)]
    UnrecognizedUsage(#[from] UnrecognizedUsageError),

    /// Validation failed for one or more fields.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// A schema document is structurally invalid.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// A usage string the factory cannot turn into a usage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized usage '{usage}': {reason}")]
pub struct UnrecognizedUsageError {
    pub usage: String,
    pub reason: String,
}

impl UnrecognizedUsageError {
    pub fn new(usage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            reason: reason.into(),
        }
    }
}

/// Collection of validation issues encountered while checking values.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if any issue on `field` carries `code`.
    pub fn has(&self, field: &str, code: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field && issue.code == code)
    }
}

/// Detailed validation failure for a single field.
///
/// `code` is the key of the constraint that rejected the value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
