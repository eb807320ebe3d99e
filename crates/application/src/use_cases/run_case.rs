//! Run Contract Case use case
//!
//! Executes one test case against a live endpoint: build the request, send
//! it once, decode the body and evaluate every assertion.

use std::sync::Arc;

use apicheck_domain::matcher::shape::field_set;
use apicheck_domain::{
    CaseVerdict, ErrorKind, ExecutionResult, Failure, PreparedRequest, TestCase,
};
use tracing::{Instrument, debug, info, warn};
use url::Url;

use crate::ports::HttpClient;
use crate::settings::RunSettings;

/// Use case for running a single contract case.
///
/// Network, timeout and decode failures abort only this case; they are
/// reported in the verdict, never returned as errors.
///
/// # Example
///
/// ```ignore
/// let runner = RunContractCase::new(Arc::new(ReqwestHttpClient::new()?), RunSettings::default());
/// let verdict = runner.run(&case, &base_url).await;
/// assert!(verdict.pass);
/// ```
pub struct RunContractCase<C: HttpClient> {
    client: Arc<C>,
    settings: RunSettings,
}

impl<C: HttpClient> RunContractCase<C> {
    /// Creates the use case with the given HTTP client.
    pub const fn new(client: Arc<C>, settings: RunSettings) -> Self {
        Self { client, settings }
    }

    /// Returns the settings this runner applies.
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Runs `case` against `base_url` and returns its verdict.
    pub async fn run(&self, case: &TestCase, base_url: &Url) -> CaseVerdict {
        let span = tracing::info_span!("case", method = %case.method, title = %case.title());
        self.run_inner(case, base_url).instrument(span).await
    }

    async fn run_inner(&self, case: &TestCase, base_url: &Url) -> CaseVerdict {
        let request = match case.prepare(base_url, self.settings.timeout_ms) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "case could not be turned into a request");
                let failure = Failure::error(ErrorKind::InvalidRequest, "buildable request", e.to_string());
                return finish(case, None, vec![failure], None);
            }
        };
        let url = request.url.to_string();

        let execution = match self.execute(case, &request).await {
            Ok(execution) => execution,
            Err(failure) => return finish(case, Some(url), vec![failure], None),
        };

        let mut failures = case.evaluate(&execution, self.settings.latency_budget_ms);
        if self.settings.verify_idempotence && case.method.is_idempotent_read() {
            failures.extend(self.check_idempotence(case, &request, &execution).await);
        }

        finish(case, Some(url), failures, Some(execution.elapsed_ms))
    }

    /// Sends the request once and decodes the response.
    async fn execute(
        &self,
        case: &TestCase,
        request: &PreparedRequest,
    ) -> Result<ExecutionResult, Failure> {
        debug!(url = %request.url, timeout_ms = request.timeout_ms, "sending request");

        let raw = match tokio::time::timeout(request.timeout(), self.client.execute(request)).await
        {
            Err(_) => {
                return Err(Failure::error(
                    ErrorKind::Timeout,
                    format!("response within {} ms", request.timeout_ms),
                    "no response before the timeout",
                ));
            }
            Ok(Err(e)) => {
                let kind = e.to_error_kind();
                let expected = if kind == ErrorKind::Timeout {
                    format!("response within {} ms", request.timeout_ms)
                } else {
                    "response".to_string()
                };
                return Err(Failure::error(kind, expected, e.to_string()));
            }
            Ok(Ok(raw)) => raw,
        };

        debug!(status = raw.status, elapsed_ms = raw.elapsed_ms(), "response received");

        ExecutionResult::decode(raw, case.requires_json()).map_err(|e| {
            Failure::error(
                ErrorKind::DecodeFailure,
                "JSON body",
                format!("{} (body: {})", e.message, e.preview),
            )
        })
    }

    /// Repeats a read and compares status and body shape with the first run.
    async fn check_idempotence(
        &self,
        case: &TestCase,
        request: &PreparedRequest,
        first: &ExecutionResult,
    ) -> Vec<Failure> {
        const DESCRIPTION: &str = "Repeated request";

        let second = match self.execute(case, request).await {
            Ok(second) => second,
            Err(failure) => {
                return vec![Failure::assertion(
                    DESCRIPTION,
                    "a second response",
                    failure.actual,
                )];
            }
        };

        let mut failures = Vec::new();
        if second.status != first.status {
            failures.push(Failure::assertion(
                format!("{DESCRIPTION}: status"),
                first.status.to_string(),
                second.status.to_string(),
            ));
        }
        let first_shape = field_set(&first.body);
        let second_shape = field_set(&second.body);
        if first_shape != second_shape {
            let join = |set: &std::collections::BTreeSet<String>| {
                set.iter().cloned().collect::<Vec<_>>().join(", ")
            };
            failures.push(Failure::assertion(
                format!("{DESCRIPTION}: body shape"),
                format!("{{{}}}", join(&first_shape)),
                format!("{{{}}}", join(&second_shape)),
            ));
        }
        failures
    }
}

fn finish(
    case: &TestCase,
    url: Option<String>,
    failures: Vec<Failure>,
    elapsed_ms: Option<u64>,
) -> CaseVerdict {
    let verdict = CaseVerdict::new(
        case.name.clone(),
        case.group.clone(),
        case.method,
        url,
        failures,
        elapsed_ms,
    );
    if verdict.pass {
        info!(elapsed_ms = ?verdict.elapsed_ms, "case passed");
    } else {
        warn!(
            failures = verdict.failures.len(),
            kind = ?verdict.fatal_kind(),
            "case failed"
        );
    }
    verdict
}
