//! CLI argument parsing definitions

use std::path::PathBuf;

use apicheck_infrastructure::{CaseFormat, ReportFormat, RunnerConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(author, version, about = "Contract tests for JSON HTTP APIs", long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a suite and report every verdict
    Run(RunArgs),

    /// List the cases of a suite without running them
    List(ListArgs),
}

/// Case selection shared by every command.
#[derive(Debug, Clone, Args)]
pub struct SelectArgs {
    /// YAML or JSON case file; the built-in posts suite when omitted
    #[arg(long, value_name = "FILE")]
    pub cases: Option<PathBuf>,

    /// Only keep cases whose `group › name` contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
}

/// Arguments of `run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Base URL every case path is joined to
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Maximum number of cases in flight
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Timeout for cases without their own, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Latency budget in milliseconds (0 disables the check)
    #[arg(long, value_name = "MS")]
    pub latency_budget_ms: Option<u64>,

    /// Repeat GET cases and compare status and body shape
    #[arg(long)]
    pub verify_idempotence: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RunArgs {
    /// Applies flags on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut RunnerConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(budget) = self.latency_budget_ms {
            config.latency_budget_ms = budget;
        }
        if self.verify_idempotence {
            config.verify_idempotence = true;
        }
    }
}

/// Arguments of `list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Listing format; yaml and json print an editable case file
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    pub format: ListFormat,
}

/// Report format of `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per case and a summary
    Text,
    /// The full report as JSON
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Output format of `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// One line per case
    Text,
    /// JSON case file
    Json,
    /// YAML case file
    Yaml,
}

impl ListFormat {
    /// Case file format, `None` for the plain listing.
    #[must_use]
    pub const fn case_format(self) -> Option<CaseFormat> {
        match self {
            Self::Text => None,
            Self::Json => Some(CaseFormat::Json),
            Self::Yaml => Some(CaseFormat::Yaml),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_override_config() {
        let cli = Cli::try_parse_from([
            "apicheck",
            "--log-level",
            "debug",
            "run",
            "--base-url",
            "http://localhost:3000",
            "--concurrency",
            "1",
            "--latency-budget-ms",
            "0",
            "--verify-idempotence",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));

        let Commands::Run(args) = cli.command else {
            unreachable!("parsed a run command");
        };
        let mut config = RunnerConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.latency_budget_ms, 0);
        assert!(config.verify_idempotence);
        assert_eq!(config.timeout_ms, RunnerConfig::default().timeout_ms);
        assert_eq!(ReportFormat::from(args.format), ReportFormat::Json);
    }

    #[test]
    fn test_unset_base_url_keeps_layered_value() {
        let cli = Cli::try_parse_from(["apicheck", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            unreachable!("parsed a run command");
        };
        assert_eq!(args.base_url, None);

        let mut config = RunnerConfig {
            base_url: "http://from-env:3000".to_string(),
            ..RunnerConfig::default()
        };
        args.apply_to(&mut config);
        assert_eq!(config.base_url, "http://from-env:3000");
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["apicheck", "list", "--filter", "delete"]).unwrap();
        let Commands::List(args) = cli.command else {
            unreachable!("parsed a list command");
        };
        assert_eq!(args.format, ListFormat::Text);
        assert_eq!(args.select.filter.as_deref(), Some("delete"));
        assert_eq!(args.select.cases, None);
    }

    #[test]
    fn test_missing_command_is_an_error() {
        assert!(Cli::try_parse_from(["apicheck"]).is_err());
    }
}
