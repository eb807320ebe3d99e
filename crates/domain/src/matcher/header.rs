//! Header substring matchers.

use serde::{Deserialize, Serialize};

use crate::verdict::Failure;

/// Expects header `name` (case-insensitive) to contain `contains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatcher {
    /// Header name.
    pub name: String,
    /// Substring the header value must contain.
    pub contains: String,
}

impl HeaderMatcher {
    /// Creates a header matcher.
    #[must_use]
    pub fn new(name: impl Into<String>, contains: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contains: contains.into(),
        }
    }

    /// `Content-Type` contains `application/json`.
    #[must_use]
    pub fn json_content_type() -> Self {
        Self::new("content-type", "application/json")
    }

    /// Get a human-readable description of this matcher.
    #[must_use]
    pub fn description(&self) -> String {
        format!("Header '{}' contains '{}'", self.name, self.contains)
    }

    /// Checks the header value found in the response, if any.
    #[must_use]
    pub fn evaluate(&self, value: Option<&str>) -> Option<Failure> {
        match value {
            Some(actual) if actual.contains(&self.contains) => None,
            Some(actual) => Some(Failure::assertion(
                self.description(),
                format!("contains '{}'", self.contains),
                actual,
            )),
            None => Some(Failure::assertion(
                self.description(),
                format!("contains '{}'", self.contains),
                "header missing",
            )),
        }
    }
}
