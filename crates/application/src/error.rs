//! Application error types

use apicheck_domain::DomainError;
use thiserror::Error;

/// Application-level errors.
///
/// Per-case problems never surface here; they become verdicts. These errors
/// stop a run before any request is sent.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The run settings are unusable.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
