//! Case files: suites stored as YAML or JSON.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use apicheck_domain::{DomainError, Suite};
use tracing::debug;

use crate::serialization::{SerializationError, from_json, from_yaml, to_json_stable, to_yaml};

/// Errors raised while reading or writing case files.
#[derive(Debug, thiserror::Error)]
pub enum CaseFileError {
    /// The file could not be read.
    #[error("failed to read case file {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The extension is not one of `yaml`, `yml` or `json`.
    #[error("unsupported case file format: {0}")]
    UnsupportedFormat(String),

    /// The content does not describe a suite.
    #[error("failed to parse case file {path}: {source}")]
    Parse {
        /// File path.
        path: String,
        /// Underlying error.
        source: SerializationError,
    },

    /// The suite parsed but a case is invalid.
    #[error("invalid case file {path}: {source}")]
    Invalid {
        /// File path.
        path: String,
        /// Underlying error.
        source: DomainError,
    },

    /// The suite could not be serialized.
    #[error("failed to serialize suite: {0}")]
    Serialize(#[from] SerializationError),
}

/// On-disk representation of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFormat {
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl CaseFormat {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`CaseFileError::UnsupportedFormat`] for anything but
    /// `yaml`, `yml` and `json`.
    pub fn from_path(path: &Path) -> Result<Self, CaseFileError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for CaseFormat {
    type Err = CaseFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(CaseFileError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for CaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parses a suite from text.
///
/// # Errors
///
/// Returns an error if the text is not a valid suite.
pub fn parse_suite(content: &str, format: CaseFormat) -> Result<Suite, SerializationError> {
    match format {
        CaseFormat::Yaml => from_yaml(content),
        CaseFormat::Json => from_json(content),
    }
}

/// Serializes a suite so it can be edited and loaded back.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn dump_suite(suite: &Suite, format: CaseFormat) -> Result<String, CaseFileError> {
    let text = match format {
        CaseFormat::Yaml => to_yaml(suite)?,
        CaseFormat::Json => to_json_stable(suite)?,
    };
    Ok(text)
}

/// Reads and validates a suite from `path`.
///
/// A suite without a name is named after the file stem.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a case is
/// invalid.
pub async fn load_suite(path: impl AsRef<Path>) -> Result<Suite, CaseFileError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let format = CaseFormat::from_path(path)?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CaseFileError::Io {
            path: display.clone(),
            source,
        })?;

    let mut suite = parse_suite(&content, format).map_err(|source| CaseFileError::Parse {
        path: display.clone(),
        source,
    })?;

    if suite.name.is_empty() {
        suite.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    suite.validate().map_err(|source| CaseFileError::Invalid {
        path: display,
        source,
    })?;

    debug!(path = %path.display(), cases = suite.len(), "case file loaded");
    Ok(suite)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use apicheck_domain::{BodyMatcher, HttpMethod, TestCase};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const YAML: &str = r#"
name: smoke
cases:
  - name: Retrieve a post
    group: "GET › positive"
    method: GET
    path: /posts/{id}
    path_params:
      id: "1"
    body_matchers:
      - type: has_field
        path: title
      - type: field_equals
        path: id
        expected: 1
  - name: Create a post
    method: POST
    path: /posts
    body:
      title: New Post
    expected_status: 201
"#;

    #[tokio::test]
    async fn test_load_yaml_suite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke.yaml");
        tokio::fs::write(&path, YAML).await.unwrap();

        let suite = load_suite(&path).await.unwrap();

        assert_eq!(suite.name, "smoke");
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.cases[0].title(), "GET › positive › Retrieve a post");
        assert_eq!(
            suite.cases[0].body_matchers,
            vec![
                BodyMatcher::has_field("title"),
                BodyMatcher::field_equals("id", 1),
            ]
        );
        assert_eq!(suite.cases[1].method, HttpMethod::Post);
        assert_eq!(suite.cases[1].body, Some(json!({"title": "New Post"})));
        assert_eq!(suite.cases[1].expected_status, 201);
    }

    #[tokio::test]
    async fn test_json_suite_takes_file_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regression.json");
        let suite = Suite::new("").with_case(TestCase::get("all", "/posts"));
        tokio::fs::write(&path, dump_suite(&suite, CaseFormat::Json).unwrap())
            .await
            .unwrap();

        let loaded = load_suite(&path).await.unwrap();
        assert_eq!(loaded.name, "regression");
        assert_eq!(loaded.cases, suite.cases);
    }

    #[tokio::test]
    async fn test_unnamed_yaml_suite_takes_file_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regression.yaml");
        tokio::fs::write(&path, "cases:\n  - name: all\n    method: GET\n    path: /posts\n")
            .await
            .unwrap();

        let suite = load_suite(&path).await.unwrap();
        assert_eq!(suite.name, "regression");
        assert_eq!(suite.cases[0].title(), "all");
    }

    #[tokio::test]
    async fn test_invalid_case_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        tokio::fs::write(&path, "cases:\n  - name: x\n    method: GET\n    path: /posts/{id}\n")
            .await
            .unwrap();

        let err = load_suite(&path).await.unwrap_err();
        assert!(matches!(err, CaseFileError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_unknown_extension() {
        let err = load_suite("cases.txt").await.unwrap_err();
        assert!(matches!(err, CaseFileError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_suite("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, CaseFileError::Io { .. }));
    }

    #[test]
    fn test_yaml_dump_parses_back() {
        let suite = Suite::new("posts").with_case(
            TestCase::delete("Delete", "/posts/{id}")
                .param("id", "1")
                .expect_body(BodyMatcher::empty_object()),
        );
        let yaml = dump_suite(&suite, CaseFormat::Yaml).unwrap();
        assert_eq!(parse_suite(&yaml, CaseFormat::Yaml).unwrap(), suite);
    }
}
