//! Body and header matchers.
//!
//! Matchers are plain data: they serialize into case files and are evaluated
//! against any JSON value without panicking. A field that does not exist is
//! treated as undefined and simply fails (or passes) the check.

mod header;
pub mod path;
pub mod shape;

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use header::HeaderMatcher;

use crate::response::preview;
use crate::verdict::Failure;

const UNDEFINED: &str = "undefined";

/// JSON value kinds, as reported by `field_type` checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any JSON number
    Number,
    /// A string
    String,
    /// An array
    Array,
    /// An object
    Object,
}

impl JsonKind {
    /// Returns the kind of `value`.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators for length checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LengthOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
}

impl LengthOperator {
    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }

    /// Applies the operator to `actual` and `expected`.
    #[must_use]
    pub const fn compare(&self, actual: usize, expected: usize) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::GreaterThan => actual > expected,
            Self::GreaterThanOrEqual => actual >= expected,
            Self::LessThan => actual < expected,
            Self::LessThanOrEqual => actual <= expected,
        }
    }
}

fn root_path() -> String {
    "$".to_string()
}

/// A predicate over a JSON response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyMatcher {
    /// The whole body deep-equals `expected`.
    Equals {
        /// Expected body.
        expected: Value,
    },
    /// The field exists (any value, including `null`).
    HasField {
        /// Field path.
        path: String,
    },
    /// The field does not exist.
    FieldAbsent {
        /// Field path.
        path: String,
    },
    /// The field deep-equals `expected`.
    FieldEquals {
        /// Field path.
        path: String,
        /// Expected value.
        expected: Value,
    },
    /// The field exists and has the given kind.
    FieldType {
        /// Field path.
        path: String,
        /// Expected kind.
        kind: JsonKind,
    },
    /// The field exists and is not `null`.
    FieldNotNull {
        /// Field path.
        path: String,
    },
    /// The field is undefined, `null`, `false`, `0` or `""`.
    FieldFalsy {
        /// Field path.
        path: String,
    },
    /// The field is a string matching `pattern`.
    FieldMatches {
        /// Field path.
        path: String,
        /// Regex pattern.
        pattern: String,
    },
    /// The value at `path` is an array.
    IsArray {
        /// Field path, the whole body by default.
        #[serde(default = "root_path")]
        path: String,
    },
    /// The length of the array, string or object at `path` satisfies the
    /// comparison.
    Length {
        /// Field path, the whole body by default.
        #[serde(default = "root_path")]
        path: String,
        /// Comparison operator.
        operator: LengthOperator,
        /// Length to compare against.
        value: usize,
    },
    /// The value at `path` is an array whose elements all satisfy `matcher`.
    /// Paths inside `matcher` are relative to the element.
    Each {
        /// Field path, the whole body by default.
        #[serde(default = "root_path")]
        path: String,
        /// Matcher applied to every element.
        matcher: Box<BodyMatcher>,
    },
}

impl BodyMatcher {
    /// Whole body equals `expected`.
    #[must_use]
    pub const fn equals(expected: Value) -> Self {
        Self::Equals { expected }
    }

    /// Body is the empty object `{}`.
    #[must_use]
    pub fn empty_object() -> Self {
        Self::Equals {
            expected: Value::Object(serde_json::Map::new()),
        }
    }

    /// Field exists.
    #[must_use]
    pub fn has_field(path: impl Into<String>) -> Self {
        Self::HasField { path: path.into() }
    }

    /// Field does not exist.
    #[must_use]
    pub fn field_absent(path: impl Into<String>) -> Self {
        Self::FieldAbsent { path: path.into() }
    }

    /// Field equals a value.
    #[must_use]
    pub fn field_equals(path: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self::FieldEquals {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Field has a kind.
    #[must_use]
    pub fn field_type(path: impl Into<String>, kind: JsonKind) -> Self {
        Self::FieldType {
            path: path.into(),
            kind,
        }
    }

    /// Field is present and not null.
    #[must_use]
    pub fn field_not_null(path: impl Into<String>) -> Self {
        Self::FieldNotNull { path: path.into() }
    }

    /// Field is falsy.
    #[must_use]
    pub fn field_falsy(path: impl Into<String>) -> Self {
        Self::FieldFalsy { path: path.into() }
    }

    /// Field matches a regex.
    #[must_use]
    pub fn field_matches(path: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::FieldMatches {
            path: path.into(),
            pattern: pattern.into(),
        }
    }

    /// Whole body is an array.
    #[must_use]
    pub fn is_array() -> Self {
        Self::IsArray { path: root_path() }
    }

    /// Whole-body length comparison.
    #[must_use]
    pub fn length(operator: LengthOperator, value: usize) -> Self {
        Self::Length {
            path: root_path(),
            operator,
            value,
        }
    }

    /// Length comparison on a field.
    #[must_use]
    pub fn field_length(path: impl Into<String>, operator: LengthOperator, value: usize) -> Self {
        Self::Length {
            path: path.into(),
            operator,
            value,
        }
    }

    /// Every element of the body array satisfies `matcher`.
    #[must_use]
    pub fn each(matcher: Self) -> Self {
        Self::Each {
            path: root_path(),
            matcher: Box::new(matcher),
        }
    }

    /// Get a human-readable description of this matcher.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Equals { expected } => format!("Body equals {}", preview(&expected.to_string())),
            Self::HasField { path } => format!("Field '{path}' exists"),
            Self::FieldAbsent { path } => format!("Field '{path}' is undefined"),
            Self::FieldEquals { path, expected } => {
                format!("Field '{path}' equals {}", preview(&expected.to_string()))
            }
            Self::FieldType { path, kind } => format!("Field '{path}' is a {kind}"),
            Self::FieldNotNull { path } => format!("Field '{path}' is not null"),
            Self::FieldFalsy { path } => format!("Field '{path}' is falsy"),
            Self::FieldMatches { path, pattern } => format!("Field '{path}' matches /{pattern}/"),
            Self::IsArray { path } => format!("'{path}' is an array"),
            Self::Length {
                path,
                operator,
                value,
            } => format!("Length of '{path}' {} {value}", operator.symbol()),
            Self::Each { path, matcher } => {
                format!("Every element of '{path}': {}", matcher.description())
            }
        }
    }

    /// Checks that paths and patterns are well formed.
    ///
    /// # Errors
    ///
    /// Returns a message naming the malformed path or pattern.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Equals { .. } => Ok(()),
            Self::HasField { path }
            | Self::FieldAbsent { path }
            | Self::FieldEquals { path, .. }
            | Self::FieldType { path, .. }
            | Self::FieldNotNull { path }
            | Self::FieldFalsy { path }
            | Self::IsArray { path }
            | Self::Length { path, .. } => path::validate(path),
            Self::FieldMatches { path, pattern } => {
                path::validate(path)?;
                Regex::new(pattern)
                    .map(|_| ())
                    .map_err(|e| format!("invalid pattern '{pattern}': {e}"))
            }
            Self::Each { path, matcher } => {
                path::validate(path)?;
                matcher.validate()
            }
        }
    }

    /// Evaluates the matcher against `body`, returning every mismatch.
    #[must_use]
    pub fn evaluate(&self, body: &Value) -> Vec<Failure> {
        let description = self.description();
        match self {
            Self::Equals { expected } => {
                if body == expected {
                    Vec::new()
                } else {
                    vec![Failure::assertion(
                        description,
                        expected.to_string(),
                        preview(&body.to_string()),
                    )]
                }
            }
            Self::Each { path, matcher } => match lookup(body, path) {
                Err(e) => vec![Failure::assertion(description, "valid path", e)],
                Ok(Some(Value::Array(items))) => items
                    .iter()
                    .enumerate()
                    .flat_map(|(index, item)| {
                        matcher.evaluate(item).into_iter().map(move |mut failure| {
                            failure.description = format!("[{index}] {}", failure.description);
                            failure
                        })
                    })
                    .collect(),
                Ok(other) => vec![Failure::assertion(description, "array", render_kind(other))],
            },
            _ => self
                .check_field(body)
                .err()
                .map(|(expected, actual)| Failure::assertion(description, expected, actual))
                .into_iter()
                .collect(),
        }
    }

    /// Single-field checks; `Err((expected, actual))` on mismatch.
    fn check_field(&self, body: &Value) -> Result<(), (String, String)> {
        let path = match self {
            Self::HasField { path }
            | Self::FieldAbsent { path }
            | Self::FieldEquals { path, .. }
            | Self::FieldType { path, .. }
            | Self::FieldNotNull { path }
            | Self::FieldFalsy { path }
            | Self::FieldMatches { path, .. }
            | Self::IsArray { path }
            | Self::Length { path, .. } => path,
            Self::Equals { .. } | Self::Each { .. } => return Ok(()),
        };
        let value = lookup(body, path).map_err(|e| ("valid path".to_string(), e))?;

        match self {
            Self::HasField { .. } => value
                .map(|_| ())
                .ok_or_else(|| ("present".to_string(), UNDEFINED.to_string())),
            Self::FieldAbsent { .. } => match value {
                None => Ok(()),
                Some(v) => Err((UNDEFINED.to_string(), preview(&v.to_string()))),
            },
            Self::FieldEquals { expected, .. } => match value {
                Some(v) if v == expected => Ok(()),
                other => Err((preview(&expected.to_string()), render_value(other))),
            },
            Self::FieldType { kind, .. } => match value {
                Some(v) if JsonKind::of(v) == *kind => Ok(()),
                other => Err((kind.to_string(), render_kind(other))),
            },
            Self::FieldNotNull { .. } => match value {
                Some(v) if !v.is_null() => Ok(()),
                other => Err(("not null".to_string(), render_value(other))),
            },
            Self::FieldFalsy { .. } => {
                if is_falsy(value) {
                    Ok(())
                } else {
                    Err(("falsy".to_string(), render_value(value)))
                }
            }
            Self::FieldMatches { pattern, .. } => {
                let regex = Regex::new(pattern)
                    .map_err(|e| ("valid pattern".to_string(), e.to_string()))?;
                match value {
                    Some(Value::String(s)) if regex.is_match(s) => Ok(()),
                    other => Err((format!("/{pattern}/"), render_value(other))),
                }
            }
            Self::IsArray { .. } => match value {
                Some(Value::Array(_)) => Ok(()),
                other => Err(("array".to_string(), render_kind(other))),
            },
            Self::Length {
                operator,
                value: expected,
                ..
            } => match value.and_then(length_of) {
                Some(actual) if operator.compare(actual, *expected) => Ok(()),
                Some(actual) => Err((
                    format!("length {} {expected}", operator.symbol()),
                    actual.to_string(),
                )),
                None => Err(("value with a length".to_string(), render_kind(value))),
            },
            Self::Equals { .. } | Self::Each { .. } => Ok(()),
        }
    }
}

fn lookup<'v>(body: &'v Value, path: &str) -> Result<Option<&'v Value>, String> {
    path::resolve(body, path)
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::String(s) => Some(s.chars().count()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f == 0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn render_value(value: Option<&Value>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |v| preview(&v.to_string()))
}

fn render_kind(value: Option<&Value>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |v| JsonKind::of(v).to_string())
}
