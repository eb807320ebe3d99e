//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while validating or preparing a case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A `{name}` placeholder in a path template has no value.
    #[error("unresolved path parameter: {0}")]
    UnresolvedPathParam(String),

    /// A path template is malformed (e.g. an unclosed brace).
    #[error("invalid path template: {0}")]
    InvalidPathTemplate(String),

    /// A test case definition is inconsistent.
    #[error("invalid test case '{name}': {reason}")]
    InvalidCase {
        /// Name of the offending case.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
