//! Decoded result of executing one test case.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RawResponse;

const PREVIEW_LEN: usize = 100;

/// The body could not be decoded as JSON although JSON was required.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response body is not valid JSON: {message}")]
pub struct DecodeError {
    /// Parser message.
    pub message: String,
    /// First characters of the offending body.
    pub preview: String,
}

/// Response of one case execution with the body decoded as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Decoded JSON body; `null` when the body was empty or not JSON and JSON
    /// was not required.
    pub body: serde_json::Value,
    /// Body as text, for diagnostics.
    pub raw_body: String,
    /// Time to response headers in milliseconds.
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    /// Decodes a raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when `require_json` is set and the body does
    /// not parse as JSON. An empty body counts as invalid JSON.
    pub fn decode(raw: RawResponse, require_json: bool) -> Result<Self, DecodeError> {
        let raw_body = raw.body_text();
        let elapsed_ms = raw.elapsed_ms();
        let body = match serde_json::from_slice::<serde_json::Value>(&raw.body) {
            Ok(value) => value,
            Err(e) if require_json => {
                return Err(DecodeError {
                    message: e.to_string(),
                    preview: preview(&raw_body),
                });
            }
            Err(_) => serde_json::Value::Null,
        };

        Ok(Self {
            status: raw.status,
            headers: raw.headers,
            body,
            raw_body,
            elapsed_ms,
        })
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Truncates `text` to a short preview on a char boundary.
#[must_use]
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LEN {
        let cut: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse::new(
            status,
            HashMap::new(),
            body.as_bytes().to_vec(),
            Duration::from_millis(40),
        )
    }

    #[test]
    fn test_decode_json_body() {
        let result = ExecutionResult::decode(raw(200, r#"{"id": 1}"#), true).unwrap();
        assert_eq!(result.body, json!({"id": 1}));
        assert_eq!(result.elapsed_ms, 40);
    }

    #[test]
    fn test_decode_failure_when_json_required() {
        let err = ExecutionResult::decode(raw(200, "<html>oops</html>"), true).unwrap_err();
        assert_eq!(err.preview, "<html>oops</html>");
    }

    #[test]
    fn test_empty_body_is_null_when_not_required() {
        let result = ExecutionResult::decode(raw(500, ""), false).unwrap();
        assert_eq!(result.body, serde_json::Value::Null);
        assert_eq!(result.status, 500);
    }

    #[test]
    fn test_empty_body_fails_when_required() {
        assert!(ExecutionResult::decode(raw(200, ""), true).is_err());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), PREVIEW_LEN + 3);
    }
}
