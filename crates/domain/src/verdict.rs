//! Per-case verdicts and the failure taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::HttpMethod;

/// Categories of case failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Expected and actual values differ. Every mismatch of a case is
    /// recorded; evaluation continues.
    AssertionFailure,
    /// DNS, connection or TLS error. Aborts the case.
    NetworkFailure,
    /// The request exceeded its timeout. Aborts the case.
    Timeout,
    /// The body was not valid JSON where JSON was required. Aborts the case.
    DecodeFailure,
    /// The case could not be turned into a request. Aborts the case.
    InvalidRequest,
    /// The run was cancelled before the case finished.
    Cancelled,
    /// The task running the case panicked or was aborted.
    Aborted,
}

impl ErrorKind {
    /// Returns a human-readable title for this kind.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::AssertionFailure => "Assertion failed",
            Self::NetworkFailure => "Network failure",
            Self::Timeout => "Request timeout",
            Self::DecodeFailure => "Invalid JSON body",
            Self::InvalidRequest => "Invalid request",
            Self::Cancelled => "Cancelled",
            Self::Aborted => "Case aborted",
        }
    }

    /// Returns true if this kind stops evaluation of the case.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::AssertionFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One recorded mismatch or error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure category.
    pub kind: ErrorKind,
    /// What the case expected.
    pub expected: String,
    /// What was observed.
    pub actual: String,
    /// Which check produced the failure.
    pub description: String,
}

impl Failure {
    /// Creates an assertion mismatch.
    #[must_use]
    pub fn assertion(
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::AssertionFailure,
            expected: expected.into(),
            actual: actual.into(),
            description: description.into(),
        }
    }

    /// Creates a failure of the given kind with an error message as actual value.
    #[must_use]
    pub fn error(kind: ErrorKind, expected: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            expected: expected.into(),
            actual: message.into(),
            description: kind.title().to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.description, self.expected, self.actual
        )
    }
}

/// Outcome of running one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseVerdict {
    /// Case name.
    pub name: String,
    /// Case group, e.g. `GET › positive`.
    pub group: String,
    /// HTTP method used.
    pub method: HttpMethod,
    /// URL requested, if the request could be built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// True when no failure was recorded.
    pub pass: bool,
    /// Failures in the order they were detected.
    #[serde(default)]
    pub failures: Vec<Failure>,
    /// Time to response headers, if a response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl CaseVerdict {
    /// Creates a verdict from the collected failures.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        method: HttpMethod,
        url: Option<String>,
        failures: Vec<Failure>,
        elapsed_ms: Option<u64>,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            method,
            url,
            pass: failures.is_empty(),
            failures,
            elapsed_ms,
        }
    }

    /// Returns the kind of the first fatal failure, if any.
    #[must_use]
    pub fn fatal_kind(&self) -> Option<ErrorKind> {
        self.failures
            .iter()
            .map(|f| f.kind)
            .find(ErrorKind::is_fatal)
    }

    /// Returns true if the case was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.fatal_kind() == Some(ErrorKind::Cancelled)
    }

    /// Returns the display title `group › name`.
    #[must_use]
    pub fn title(&self) -> String {
        if self.group.is_empty() {
            self.name.clone()
        } else {
            format!("{} › {}", self.group, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verdict_passes_without_failures() {
        let verdict = CaseVerdict::new(
            "Retrieve a post",
            "GET › positive",
            HttpMethod::Get,
            Some("https://api.example.com/posts/1".to_string()),
            Vec::new(),
            Some(42),
        );
        assert!(verdict.pass);
        assert_eq!(verdict.fatal_kind(), None);
        assert_eq!(verdict.title(), "GET › positive › Retrieve a post");
    }

    #[test]
    fn test_verdict_fatal_kind() {
        let failures = vec![
            Failure::assertion("Status code", "200", "404"),
            Failure::error(ErrorKind::DecodeFailure, "JSON body", "expected value at line 1"),
        ];
        let verdict = CaseVerdict::new("x", "", HttpMethod::Get, None, failures, None);
        assert!(!verdict.pass);
        assert_eq!(verdict.fatal_kind(), Some(ErrorKind::DecodeFailure));
        assert_eq!(verdict.title(), "x");
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::assertion("Status code", "200", "404");
        assert_eq!(failure.to_string(), "Status code: expected 200, got 404");
    }

    #[test]
    fn test_error_kind_serde() {
        let json = serde_json::to_string(&ErrorKind::NetworkFailure).unwrap_or_default();
        assert_eq!(json, "\"network_failure\"");
    }
}
