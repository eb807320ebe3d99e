//! Query parameter types

use serde::{Deserialize, Serialize};
use url::Url;

/// A query parameter key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    pub key: String,
    /// The parameter value
    pub value: String,
}

impl QueryParam {
    /// Creates a new query parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of query parameters.
///
/// Order is preserved when the parameters are appended to a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    items: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty query parameter collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a query parameter to the collection.
    pub fn add(&mut self, param: QueryParam) {
        self.items.push(param);
    }

    /// Returns true if there are no parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends every parameter to `url`, form-urlencoded.
    ///
    /// A URL without parameters is left untouched (no trailing `?`).
    pub fn apply_to(&self, url: &mut Url) {
        if self.items.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        for param in &self.items {
            pairs.append_pair(&param.key, &param.value);
        }
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<T: IntoIterator<Item = QueryParam>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_param_creation() {
        let param = QueryParam::new("userId", "1");
        assert_eq!(param.key, "userId");
        assert_eq!(param.value, "1");
    }

    #[test]
    fn test_apply_preserves_order_and_encodes() {
        let params: QueryParams = [
            QueryParam::new("userId", "1"),
            QueryParam::new("q", "a b&c"),
        ]
        .into_iter()
        .collect();

        let mut url = Url::parse("https://api.example.com/posts").unwrap();
        params.apply_to(&mut url);
        assert_eq!(url.as_str(), "https://api.example.com/posts?userId=1&q=a+b%26c");
    }

    #[test]
    fn test_apply_empty_leaves_url_untouched() {
        let mut url = Url::parse("https://api.example.com/posts/1").unwrap();
        QueryParams::new().apply_to(&mut url);
        assert_eq!(url.as_str(), "https://api.example.com/posts/1");
    }
}
