//! Path templates with `{name}` placeholders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A URL path containing optional `{name}` placeholders, e.g. `/posts/{id}`.
///
/// Placeholder values are percent-encoded as a single path segment when the
/// template is rendered. Literal text outside placeholders is passed through
/// as written, so an already-encoded path such as `/posts/%21%40` is sent
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Creates a template from its raw text.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes every placeholder with its encoded value.
    ///
    /// The result always starts with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnresolvedPathParam`] when a placeholder has no
    /// value in `params`, or [`DomainError::InvalidPathTemplate`] when the
    /// template is malformed.
    pub fn render(&self, params: &BTreeMap<String, String>) -> DomainResult<String> {
        let mut out = String::with_capacity(self.0.len() + 8);
        if !self.0.starts_with('/') {
            out.push('/');
        }
        self.walk(|piece| {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Placeholder(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| DomainError::UnresolvedPathParam(name.to_string()))?;
                    out.push_str(&urlencoding::encode(value));
                }
            }
            Ok(())
        })?;
        Ok(out)
    }

    fn walk<'a, F>(&'a self, mut visit: F) -> DomainResult<()>
    where
        F: FnMut(Piece<'a>) -> DomainResult<()>,
    {
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            if open > 0 {
                visit(Piece::Literal(&rest[..open]))?;
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                DomainError::InvalidPathTemplate(format!("unclosed '{{' in '{}'", self.0))
            })?;
            let name = after[..close].trim();
            if name.is_empty() {
                return Err(DomainError::InvalidPathTemplate(format!(
                    "empty placeholder in '{}'",
                    self.0
                )));
            }
            visit(Piece::Placeholder(name))?;
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            visit(Piece::Literal(rest))?;
        }
        Ok(())
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathTemplate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}
