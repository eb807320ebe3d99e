//! Fully resolved request, ready to hand to an HTTP client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// A concrete HTTP request built from a test case and a base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string
    pub url: Url,
    /// JSON body, sent with `Content-Type: application/json` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl PreparedRequest {
    /// Creates a request without a body and with the default timeout.
    #[must_use]
    pub const fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Validates that `base` is an absolute HTTP(S) URL usable as an origin.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] if the URL does not parse or uses a
/// scheme other than `http`/`https`.
pub fn parse_base_url(base: &str) -> DomainResult<Url> {
    let url = Url::parse(base.trim()).map_err(|e| DomainError::InvalidUrl(format!("{e}: {base}")))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(DomainError::InvalidUrl(format!(
            "base URL must be an http(s) origin: {base}"
        ))),
    }
}

/// Joins an already-rendered path (starting with `/`) onto `base`.
///
/// Any path prefix on `base` is kept: `https://host/api` + `/posts` gives
/// `https://host/api/posts`. Query and fragment of `base` are dropped.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] if the combined URL does not parse.
pub fn join_path(base: &Url, path: &str) -> DomainResult<Url> {
    let mut origin = base.clone();
    origin.set_query(None);
    origin.set_fragment(None);
    let prefix = origin.as_str().trim_end_matches('/');
    let combined = format!("{prefix}{path}");
    Url::parse(&combined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {combined}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("https://jsonplaceholder.typicode.com").is_ok());
        assert!(parse_base_url("http://127.0.0.1:8080/").is_ok());
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(DomainError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(DomainError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_join_path_on_origin() {
        let base = parse_base_url("https://api.example.com").unwrap();
        let url = join_path(&base, "/posts/1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/posts/1");
    }

    #[test]
    fn test_join_path_keeps_prefix() {
        let base = parse_base_url("https://api.example.com/v1/").unwrap();
        let url = join_path(&base, "/posts").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/posts");
    }

    #[test]
    fn test_join_path_keeps_trailing_slash_and_escapes() {
        let base = parse_base_url("https://api.example.com").unwrap();
        assert_eq!(
            join_path(&base, "/posts/").unwrap().as_str(),
            "https://api.example.com/posts/"
        );
        assert_eq!(
            join_path(&base, "/posts/%21%40").unwrap().as_str(),
            "https://api.example.com/posts/%21%40"
        );
    }

    #[test]
    fn test_prepared_request_builder() {
        let url = Url::parse("https://api.example.com/posts").unwrap();
        let request = PreparedRequest::new(HttpMethod::Post, url)
            .with_body(serde_json::json!({"title": "x"}))
            .with_timeout_ms(250);
        assert_eq!(request.timeout(), Duration::from_millis(250));
        assert!(request.body.is_some());
    }
}
