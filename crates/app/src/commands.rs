//! Command handlers behind the CLI.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use apicheck_application::{CancellationReceiver, RunContractCase, RunSuite};
use apicheck_domain::{Suite, SuiteReport};
use apicheck_infrastructure::{
    ConfigLoader, ReqwestHttpClient, RunnerConfig, SystemClock, dump_suite, load_suite,
    render_case_list, render_report,
};
use tracing::{info, warn};

use crate::cli::{ListArgs, RunArgs, SelectArgs};
use crate::suites;

/// How a command ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every case passed, or nothing had to run.
    Passed,
    /// At least one case failed.
    Failed,
    /// The run was interrupted.
    Cancelled,
}

impl Outcome {
    /// Process exit code of a command that ended with a startup error.
    pub const ERROR_CODE: u8 = 2;

    /// Returns the process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
            Self::Cancelled => 130,
        }
    }

    /// Classifies a finished report.
    #[must_use]
    pub const fn of(report: &SuiteReport) -> Self {
        if report.cancelled {
            Self::Cancelled
        } else if report.failed == 0 {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        Self::from(outcome.code())
    }
}

/// Loads configuration from `--config` (or the working-directory file) and
/// the environment.
///
/// # Errors
///
/// Returns an error if a source cannot be read or is invalid.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RunnerConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    loader.load().context("failed to load configuration")
}

/// Resolves the suite to work on: a case file or the built-in table,
/// narrowed by `--filter`.
///
/// # Errors
///
/// Returns an error if the case file cannot be loaded.
pub async fn select_suite(select: &SelectArgs) -> anyhow::Result<Suite> {
    let suite = match &select.cases {
        Some(path) => load_suite(path)
            .await
            .with_context(|| format!("failed to load cases from {}", path.display()))?,
        None => suites::builtin(),
    };

    Ok(match &select.filter {
        Some(pattern) => {
            let filtered = suite.filtered(pattern);
            info!(pattern, kept = filtered.len(), of = suite.len(), "filter applied");
            filtered
        }
        None => suite,
    })
}

/// Runs `suite` with `config` and returns the report.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client
/// cannot be built, or the suite is rejected before running.
pub async fn execute(
    config: &RunnerConfig,
    suite: &Suite,
    cancel: CancellationReceiver,
) -> anyhow::Result<SuiteReport> {
    config.validate().context("invalid configuration")?;
    let base_url = config.base_url()?;

    let client = ReqwestHttpClient::with_user_agent(&config.user_agent)
        .context("failed to create HTTP client")?;
    let runner = Arc::new(RunContractCase::new(Arc::new(client), config.run_settings()));
    let use_case = RunSuite::new(runner, Arc::new(SystemClock::new()));

    use_case
        .run(suite, &base_url, cancel)
        .await
        .context("suite could not be run")
}

/// `apicheck run`.
///
/// # Errors
///
/// Returns an error for configuration, case file or output failures.
/// Failing cases are not errors; they show in the outcome.
pub async fn run(
    config_path: Option<&Path>,
    args: &RunArgs,
    cancel: CancellationReceiver,
) -> anyhow::Result<Outcome> {
    let mut config = load_config(config_path)?;
    args.apply_to(&mut config);

    let suite = select_suite(&args.select).await?;
    if suite.is_empty() {
        warn!(suite = %suite.name, "no cases selected");
    }

    let report = execute(&config, &suite, cancel).await?;
    let rendered = render_report(&report, args.format.into())?;
    write_stdout(&rendered)?;

    Ok(Outcome::of(&report))
}

/// `apicheck list`.
///
/// # Errors
///
/// Returns an error if the case file cannot be loaded or the output
/// cannot be written.
pub async fn list(args: &ListArgs) -> anyhow::Result<Outcome> {
    let suite = select_suite(&args.select).await?;
    let rendered = match args.format.case_format() {
        Some(format) => dump_suite(&suite, format)?,
        None => render_case_list(&suite),
    };
    write_stdout(&rendered)?;
    Ok(Outcome::Passed)
}

fn write_stdout(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use apicheck_domain::{CaseVerdict, ErrorKind, Failure, HttpMethod};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn report(failures: Vec<Failure>) -> SuiteReport {
        SuiteReport::new(
            "posts",
            "http://localhost/",
            Utc::now(),
            vec![CaseVerdict::new("a", "", HttpMethod::Get, None, failures, None)],
            1,
        )
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::of(&report(Vec::new())).code(), 0);
        assert_eq!(
            Outcome::of(&report(vec![Failure::assertion("Status code", "200 OK", "404 Not Found")]))
                .code(),
            1
        );
        assert_eq!(
            Outcome::of(&report(vec![Failure::error(
                ErrorKind::Cancelled,
                "case to complete",
                "run cancelled"
            )]))
            .code(),
            130
        );
        assert_eq!(Outcome::ERROR_CODE, 2);
    }

    #[tokio::test]
    async fn test_select_builtin_with_filter() {
        let select = SelectArgs {
            cases: None,
            filter: Some("DELETE › negative".to_string()),
        };
        let suite = select_suite(&select).await.unwrap();
        assert_eq!(suite.len(), 5);
        assert!(suite.cases.iter().all(|c| c.group == "DELETE › negative"));
    }

    #[tokio::test]
    async fn test_select_missing_case_file() {
        let select = SelectArgs {
            cases: Some("/definitely/not/here.yaml".into()),
            filter: None,
        };
        assert!(select_suite(&select).await.is_err());
    }
}
