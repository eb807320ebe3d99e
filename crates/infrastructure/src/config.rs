//! Runner configuration loading.
//!
//! Layers, later ones win: built-in defaults, an optional config file
//! (TOML, YAML or JSON by extension) and `APICHECK_`-prefixed environment
//! variables. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use apicheck_application::{DEFAULT_CONCURRENCY, DEFAULT_LATENCY_BUDGET_MS, RunSettings};
use apicheck_domain::request::{DEFAULT_TIMEOUT_MS, parse_base_url};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::adapters::DEFAULT_USER_AGENT;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "apicheck.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "APICHECK";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A setting is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fully resolved runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Origin every case path is joined to.
    pub base_url: String,
    /// Maximum number of cases in flight.
    pub concurrency: usize,
    /// Timeout for cases without their own, in milliseconds.
    pub timeout_ms: u64,
    /// Latency budget in milliseconds; `0` disables the check.
    pub latency_budget_ms: u64,
    /// Repeat GET cases and compare status and body shape.
    pub verify_idempotence: bool,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
            verify_idempotence: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RunnerConfig {
    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent is empty".to_string()));
        }
        Ok(())
    }

    /// Parses the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless it is an absolute
    /// http(s) URL with a host.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Settings handed to the suite runner.
    #[must_use]
    pub const fn run_settings(&self) -> RunSettings {
        RunSettings {
            concurrency: self.concurrency,
            timeout_ms: self.timeout_ms,
            latency_budget_ms: if self.latency_budget_ms == 0 {
                None
            } else {
                Some(self.latency_budget_ms)
            },
            verify_idempotence: self.verify_idempotence,
        }
    }
}

/// Builds a [`RunnerConfig`] from its layered sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    fallback_file: Option<PathBuf>,
    environment: Option<::config::Map<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader reading `APICHECK_*` variables and, when present,
    /// `apicheck.toml` from the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            file: None,
            fallback_file: Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
            environment: None,
        }
    }

    /// Reads `path`, which must exist, instead of the working-directory file.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Uses `path`, when it exists, as the fallback config file.
    #[must_use]
    pub fn with_fallback_file(mut self, path: Option<PathBuf>) -> Self {
        self.fallback_file = path;
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    #[must_use]
    pub fn with_environment(mut self, vars: ::config::Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, a value has the wrong
    /// type, or the result fails validation.
    pub fn load(&self) -> Result<RunnerConfig, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            debug!(path = %path.display(), "reading config file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        } else if let Some(path) = &self.fallback_file {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(self.environment.clone()),
        );

        let config: RunnerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn loader() -> ConfigLoader {
        ConfigLoader::new()
            .with_fallback_file(None)
            .with_environment(::config::Map::new())
    }

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = loader().load().unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.base_url, "https://jsonplaceholder.typicode.com");
        assert_eq!(config.run_settings(), RunSettings::default());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let file = write_file(
            ".toml",
            "base_url = \"http://localhost:3000\"\nconcurrency = 8\nverify_idempotence = true\n",
        );
        let config = loader().with_file(file.path()).load().unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.concurrency, 8);
        assert!(config.verify_idempotence);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_yaml_file() {
        let file = write_file(".yaml", "timeout_ms: 250\nlatency_budget_ms: 0\n");
        let config = loader().with_file(file.path()).load().unwrap();

        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.run_settings().latency_budget_ms, None);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_file(".toml", "concurrency = 8\n");
        let mut vars = ::config::Map::new();
        vars.insert("APICHECK_CONCURRENCY".to_string(), "2".to_string());
        vars.insert("APICHECK_BASE_URL".to_string(), "http://127.0.0.1:8080".to_string());

        let config = loader()
            .with_file(file.path())
            .with_environment(vars)
            .load()
            .unwrap();

        assert_eq!(config.concurrency, 2);
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = loader()
            .with_file("/definitely/not/here/apicheck.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_missing_fallback_file_is_ignored() {
        let config = loader()
            .with_fallback_file(Some(PathBuf::from("/definitely/not/here/apicheck.toml")))
            .load()
            .unwrap();
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_validation() {
        let bad_url = RunnerConfig {
            base_url: "ftp://example.com".to_string(),
            ..RunnerConfig::default()
        };
        assert!(matches!(
            bad_url.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let zero = RunnerConfig {
            concurrency: 0,
            ..RunnerConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));

        let zero_timeout = RunnerConfig {
            timeout_ms: 0,
            ..RunnerConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
