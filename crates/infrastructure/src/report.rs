//! Report rendering for the terminal and for machines.

use std::fmt::Write as _;
use std::str::FromStr;

use apicheck_domain::{CaseVerdict, Suite, SuiteReport};

use crate::serialization::{SerializationError, to_json_stable};

/// Errors raised while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The requested format is unknown.
    #[error("unsupported report format: {0}")]
    UnsupportedFormat(String),

    /// The report could not be serialized.
    #[error(transparent)]
    Serialize(#[from] SerializationError),
}

/// Output format of a suite report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Stable, indented JSON.
    Json,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Renders `report` in the given format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_report(report: &SuiteReport, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => Ok(to_json_stable(report)?),
    }
}

/// Renders one line per case, failure details beneath, then a summary.
#[must_use]
pub fn render_text(report: &SuiteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} against {}", report.suite, report.base_url);
    let _ = writeln!(out);

    for verdict in &report.verdicts {
        write_verdict(&mut out, verdict);
    }

    let _ = writeln!(out);
    if report.cancelled {
        let _ = writeln!(out, "run cancelled before every case finished");
    }
    let _ = writeln!(
        out,
        "{} passed, {} failed ({} ms)",
        report.passed, report.failed, report.duration_ms
    );
    out
}

fn write_verdict(out: &mut String, verdict: &CaseVerdict) {
    let status = if verdict.pass { "PASS" } else { "FAIL" };
    let elapsed = verdict
        .elapsed_ms
        .map(|ms| format!(" ({ms} ms)"))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{status}  {:<6} {}{elapsed}",
        verdict.method.as_str(),
        verdict.title()
    );

    if verdict.pass {
        return;
    }
    if let Some(url) = &verdict.url {
        let _ = writeln!(out, "      url: {url}");
    }
    for failure in &verdict.failures {
        let _ = writeln!(out, "      {failure}");
    }
}

/// Renders the cases of a suite, one per line.
#[must_use]
pub fn render_case_list(suite: &Suite) -> String {
    let mut out = String::new();
    for case in &suite.cases {
        let _ = writeln!(
            out,
            "{:<6} {:<24} {:>3}  {}",
            case.method.as_str(),
            case.path.as_str(),
            case.expected_status,
            case.title()
        );
    }
    let _ = writeln!(out, "{} cases", suite.len());
    out
}
