//! Declarative test cases and suites.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::matcher::{BodyMatcher, HeaderMatcher};
use crate::request::{
    DEFAULT_TIMEOUT_MS, HttpMethod, PathTemplate, PreparedRequest, QueryParam, QueryParams,
    join_path,
};
use crate::response::{ExecutionResult, reason_phrase};
use crate::verdict::Failure;

const fn default_true() -> bool {
    true
}

const fn default_status() -> u16 {
    200
}

/// One HTTP contract check.
///
/// Cases are immutable data once built; the runner only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Case name, unique within its group.
    pub name: String,
    /// Group label, e.g. `GET › positive`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template relative to the base URL.
    pub path: PathTemplate,
    /// Values for `{name}` placeholders in `path`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path_params: BTreeMap<String, String>,
    /// Query parameters, appended in order.
    #[serde(default, skip_serializing_if = "QueryParams::is_empty")]
    pub query: QueryParams,
    /// JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Expected HTTP status.
    #[serde(default = "default_status")]
    pub expected_status: u16,
    /// Body checks, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_matchers: Vec<BodyMatcher>,
    /// Header checks, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header_matchers: Vec<HeaderMatcher>,
    /// Latency budget for this case; the run-wide budget applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_elapsed_ms: Option<u64>,
    /// Request timeout for this case; the run-wide timeout applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Whether the response body must be JSON. Always required for expected
    /// statuses 200 and 201.
    #[serde(default = "default_true")]
    pub expects_json: bool,
}

impl TestCase {
    /// Creates a case expecting `200` with a JSON body.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            method,
            path: PathTemplate::new(path),
            path_params: BTreeMap::new(),
            query: QueryParams::new(),
            body: None,
            expected_status: default_status(),
            body_matchers: Vec::new(),
            header_matchers: Vec::new(),
            max_elapsed_ms: None,
            timeout_ms: None,
            expects_json: true,
        }
    }

    /// Creates a GET case.
    #[must_use]
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Get, path)
    }

    /// Creates a POST case.
    #[must_use]
    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Post, path)
    }

    /// Creates a PUT case.
    #[must_use]
    pub fn put(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Put, path)
    }

    /// Creates a DELETE case.
    #[must_use]
    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Delete, path)
    }

    /// Sets the group label.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets a path parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.add(QueryParam::new(key, value));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the expected status.
    #[must_use]
    pub const fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Adds a body matcher.
    #[must_use]
    pub fn expect_body(mut self, matcher: BodyMatcher) -> Self {
        self.body_matchers.push(matcher);
        self
    }

    /// Adds several body matchers.
    #[must_use]
    pub fn expect_bodies(mut self, matchers: impl IntoIterator<Item = BodyMatcher>) -> Self {
        self.body_matchers.extend(matchers);
        self
    }

    /// Adds a header matcher.
    #[must_use]
    pub fn expect_header(mut self, matcher: HeaderMatcher) -> Self {
        self.header_matchers.push(matcher);
        self
    }

    /// Sets the latency budget.
    #[must_use]
    pub const fn within_ms(mut self, max_elapsed_ms: u64) -> Self {
        self.max_elapsed_ms = Some(max_elapsed_ms);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Accepts a non-JSON body (e.g. error pages).
    #[must_use]
    pub const fn allow_non_json(mut self) -> Self {
        self.expects_json = false;
        self
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

    /// Returns true if the response body must decode as JSON.
    #[must_use]
    pub const fn requires_json(&self) -> bool {
        self.expects_json || matches!(self.expected_status, 200 | 201)
    }

    /// Checks the case for authoring mistakes.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCase`] for an empty name, an unresolved
    /// or malformed path template, an out-of-range status, or a malformed
    /// matcher.
    pub fn validate(&self) -> DomainResult<()> {
        let invalid = |reason: String| DomainError::InvalidCase {
            name: self.title(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if !(100..=599).contains(&self.expected_status) {
            return Err(invalid(format!(
                "expected status {} is out of range",
                self.expected_status
            )));
        }
        self.path
            .render(&self.path_params)
            .map_err(|e| invalid(e.to_string()))?;
        for matcher in &self.body_matchers {
            matcher.validate().map_err(invalid)?;
        }
        Ok(())
    }

    /// Builds the concrete request against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if a path parameter is missing or the resulting URL
    /// is invalid.
    pub fn prepare(&self, base: &Url, default_timeout_ms: u64) -> DomainResult<PreparedRequest> {
        let path = self.path.render(&self.path_params)?;
        let mut url = join_path(base, &path)?;
        self.query.apply_to(&mut url);

        let mut request = PreparedRequest::new(self.method, url)
            .with_timeout_ms(self.timeout_ms.unwrap_or(default_timeout_ms));
        if let Some(body) = &self.body {
            request = request.with_body(body.clone());
        }
        Ok(request)
    }

    /// Builds the request with the default timeout.
    ///
    /// # Errors
    ///
    /// See [`TestCase::prepare`].
    pub fn prepare_default(&self, base: &Url) -> DomainResult<PreparedRequest> {
        self.prepare(base, DEFAULT_TIMEOUT_MS)
    }

    /// Evaluates every assertion of the case, collecting all mismatches.
    ///
    /// Order: status, headers, latency, body matchers.
    #[must_use]
    pub fn evaluate(&self, result: &ExecutionResult, latency_budget_ms: Option<u64>) -> Vec<Failure> {
        let mut failures = Vec::new();

        if result.status != self.expected_status {
            failures.push(Failure::assertion(
                "Status code",
                format!(
                    "{} {}",
                    self.expected_status,
                    reason_phrase(self.expected_status)
                ),
                format!("{} {}", result.status, reason_phrase(result.status)),
            ));
        }

        for matcher in &self.header_matchers {
            let value = result.get_header(&matcher.name).map(String::as_str);
            failures.extend(matcher.evaluate(value));
        }

        if let Some(budget) = self.max_elapsed_ms.or(latency_budget_ms) {
            if result.elapsed_ms > budget {
                failures.push(Failure::assertion(
                    "Response time",
                    format!("<= {budget} ms"),
                    format!("{} ms", result.elapsed_ms),
                ));
            }
        }

        for matcher in &self.body_matchers {
            failures.extend(matcher.evaluate(&result.body));
        }

        failures
    }
}

/// A named, ordered table of test cases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Suite {
    /// Suite name.
    #[serde(default)]
    pub name: String,
    /// Cases in execution and report order.
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

impl Suite {
    /// Creates an empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Adds a case (builder pattern).
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Adds several cases sharing one group label.
    #[must_use]
    pub fn with_group(mut self, group: &str, cases: impl IntoIterator<Item = TestCase>) -> Self {
        self.cases
            .extend(cases.into_iter().map(|case| case.in_group(group)));
        self
    }

    /// Check if the suite is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Get the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns a copy keeping only cases whose title contains `pattern`
    /// (case-insensitive).
    #[must_use]
    pub fn filtered(&self, pattern: &str) -> Self {
        let needle = pattern.to_lowercase();
        Self {
            name: self.name.clone(),
            cases: self
                .cases
                .iter()
                .filter(|case| case.title().to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        }
    }

    /// Validates every case and checks titles are unique.
    ///
    /// # Errors
    ///
    /// Returns the first invalid case.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for case in &self.cases {
            case.validate()?;
            if !seen.insert(case.title()) {
                return Err(DomainError::InvalidCase {
                    name: case.title(),
                    reason: "duplicate case title".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::matcher::JsonKind;
    use crate::request::parse_base_url;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn result(status: u16, body: Value, elapsed_ms: u64) -> ExecutionResult {
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        ExecutionResult {
            status,
            headers,
            raw_body: body.to_string(),
            body,
            elapsed_ms,
        }
    }

    #[test]
    fn test_prepare_substitutes_and_encodes() {
        let base = parse_base_url("https://api.example.com").unwrap();
        let case = TestCase::delete("Delete with query", "/posts/{id}")
            .param("id", "1")
            .query("userId", "1");
        let request = case.prepare(&base, 1_000).unwrap();
        assert_eq!(request.url.as_str(), "https://api.example.com/posts/1?userId=1");
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.timeout_ms, 1_000);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_prepare_uses_case_timeout_and_body() {
        let base = parse_base_url("https://api.example.com").unwrap();
        let case = TestCase::post("Create", "/posts")
            .json_body(json!({"title": "New Post"}))
            .timeout_ms(250);
        let request = case.prepare_default(&base).unwrap();
        assert_eq!(request.timeout_ms, 250);
        assert_eq!(request.body, Some(json!({"title": "New Post"})));
    }

    #[test]
    fn test_prepare_missing_param() {
        let base = parse_base_url("https://api.example.com").unwrap();
        let err = TestCase::get("x", "/posts/{id}").prepare_default(&base).unwrap_err();
        assert_eq!(err, DomainError::UnresolvedPathParam("id".to_string()));
    }

    #[test]
    fn test_evaluate_collects_all_failures() {
        let case = TestCase::get("Retrieve a post", "/posts/1")
            .expect_header(HeaderMatcher::new("content-type", "text/plain"))
            .expect_body(BodyMatcher::field_equals("id", 1))
            .expect_body(BodyMatcher::field_type("title", JsonKind::String));

        let failures = case.evaluate(&result(404, json!({}), 2_500), Some(2_000));
        let descriptions: Vec<_> = failures.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Status code",
                "Header 'content-type' contains 'text/plain'",
                "Response time",
                "Field 'id' equals 1",
                "Field 'title' is a string",
            ]
        );
        assert_eq!(failures[0].expected, "200 OK");
        assert_eq!(failures[0].actual, "404 Not Found");
    }

    #[test]
    fn test_evaluate_passes_post_by_id() {
        let case = TestCase::get("Retrieve a post", "/posts/{id}")
            .param("id", "1")
            .expect_bodies([
                BodyMatcher::has_field("userId"),
                BodyMatcher::has_field("id"),
                BodyMatcher::has_field("title"),
                BodyMatcher::has_field("body"),
                BodyMatcher::field_equals("id", 1),
            ]);
        let body = json!({"userId": 1, "id": 1, "title": "t", "body": "b"});
        assert!(case.evaluate(&result(200, body, 30), Some(2_000)).is_empty());
    }

    #[test]
    fn test_case_budget_overrides_run_budget() {
        let case = TestCase::get("slow ok", "/posts").within_ms(5_000);
        assert!(case.evaluate(&result(200, json!([]), 3_000), Some(2_000)).is_empty());
        let case = TestCase::get("no budget", "/posts");
        assert!(case.evaluate(&result(200, json!([]), 9_000), None).is_empty());
    }

    #[test]
    fn test_requires_json() {
        assert!(TestCase::get("a", "/").requires_json());
        assert!(TestCase::get("a", "/").allow_non_json().requires_json());
        assert!(
            !TestCase::put("a", "/")
                .expect_status(500)
                .allow_non_json()
                .requires_json()
        );
    }

    #[test]
    fn test_validate_case() {
        assert!(TestCase::get("ok", "/posts/{id}").param("id", "1").validate().is_ok());
        assert!(TestCase::get("", "/posts").validate().is_err());
        assert!(TestCase::get("bad status", "/posts").expect_status(42).validate().is_err());
        assert!(TestCase::get("missing", "/posts/{id}").validate().is_err());
        assert!(
            TestCase::get("bad path", "/posts")
                .expect_body(BodyMatcher::has_field("a["))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_suite_duplicate_titles_and_filter() {
        let suite = Suite::new("posts").with_group(
            "GET › positive",
            [TestCase::get("A", "/posts"), TestCase::get("B", "/posts/1")],
        );
        assert!(suite.validate().is_ok());
        assert_eq!(suite.filtered("get › positive › b").len(), 1);
        assert_eq!(suite.filtered("GET").len(), 2);

        let dup = suite.clone().with_case(TestCase::get("A", "/x").in_group("GET › positive"));
        assert!(matches!(dup.validate(), Err(DomainError::InvalidCase { .. })));
    }

    #[test]
    fn test_case_deserializes_with_defaults() {
        let case: TestCase = serde_json::from_value(json!({
            "name": "Retrieve all posts",
            "method": "GET",
            "path": "/posts",
            "body_matchers": [{"type": "is_array"}]
        }))
        .unwrap();
        assert_eq!(case.expected_status, 200);
        assert!(case.expects_json);
        assert_eq!(case.body_matchers, vec![BodyMatcher::is_array()]);
    }
}
