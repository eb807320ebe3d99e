//! Run Suite use case
//!
//! Runs every case of a suite with bounded concurrency and assembles a
//! report whose verdicts follow the case table order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use apicheck_domain::{CaseVerdict, ErrorKind, Failure, Suite, SuiteReport, TestCase};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{error, info, warn};
use url::Url;

use crate::ApplicationResult;
use crate::ports::{CancellationReceiver, Clock, HttpClient};
use crate::use_cases::RunContractCase;

/// Use case for running a whole suite.
pub struct RunSuite<C: HttpClient + 'static> {
    runner: Arc<RunContractCase<C>>,
    clock: Arc<dyn Clock>,
}

impl<C: HttpClient + 'static> RunSuite<C> {
    /// Creates the use case.
    pub fn new(runner: Arc<RunContractCase<C>>, clock: Arc<dyn Clock>) -> Self {
        Self { runner, clock }
    }

    /// Runs `suite` against `base_url`.
    ///
    /// Cases run independently; a failing case never stops the others.
    /// When `cancel` fires, cases that have not finished are reported as
    /// cancelled and the report is returned straight away.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings or any case of the suite are
    /// invalid. Failing cases are reported, not returned as errors.
    pub async fn run(
        &self,
        suite: &Suite,
        base_url: &Url,
        mut cancel: CancellationReceiver,
    ) -> ApplicationResult<SuiteReport> {
        let settings = *self.runner.settings();
        settings.validate()?;
        suite.validate()?;

        let started_at = self.clock.now();
        let start = Instant::now();
        info!(
            suite = %suite.name,
            cases = suite.len(),
            concurrency = settings.concurrency,
            base_url = %base_url,
            "starting suite"
        );

        let semaphore = Arc::new(Semaphore::new(settings.concurrency));
        let mut slots: Vec<Option<CaseVerdict>> = vec![None; suite.len()];
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::new();

        for (index, case) in suite.cases.iter().enumerate() {
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            let case = case.clone();
            let base_url = base_url.clone();
            let mut cancel = cancel.clone();

            let handle = tasks.spawn(async move {
                let verdict = tokio::select! {
                    biased;
                    () = cancel.cancelled() => cancelled_verdict(&case),
                    verdict = async {
                        let Ok(_permit) = semaphore.acquire_owned().await else {
                            return cancelled_verdict(&case);
                        };
                        runner.run(&case, &base_url).await
                    } => verdict,
                };
                (index, verdict)
            });
            task_index.insert(handle.id(), index);
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    while let Some(joined) = tasks.try_join_next() {
                        record(joined, suite, &task_index, &mut slots);
                    }
                    warn!(suite = %suite.name, "run cancelled, abandoning unfinished cases");
                    tasks.abort_all();
                    break;
                }
                joined = tasks.join_next() => match joined {
                    Some(joined) => record(joined, suite, &task_index, &mut slots),
                    None => break,
                },
            }
        }

        let cancelled = cancel.is_cancelled();
        let verdicts = suite
            .cases
            .iter()
            .zip(slots)
            .map(|(case, slot)| {
                slot.unwrap_or_else(|| {
                    if cancelled {
                        cancelled_verdict(case)
                    } else {
                        aborted_verdict(case, "case task did not report")
                    }
                })
            })
            .collect();

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = SuiteReport::new(
            suite.name.clone(),
            base_url.as_str(),
            started_at,
            verdicts,
            duration_ms,
        );

        info!(
            suite = %report.suite,
            passed = report.passed,
            failed = report.failed,
            duration_ms,
            "suite finished"
        );
        Ok(report)
    }
}

/// Stores a finished task's verdict in its slot. A task that panicked or
/// was aborted gets an `Aborted` verdict carrying the join error.
fn record(
    joined: Result<(usize, CaseVerdict), JoinError>,
    suite: &Suite,
    task_index: &HashMap<task::Id, usize>,
    slots: &mut [Option<CaseVerdict>],
) {
    match joined {
        Ok((index, verdict)) => slots[index] = Some(verdict),
        Err(e) => {
            error!(error = %e, "case task failed");
            if let Some(&index) = task_index.get(&e.id()) {
                slots[index] = Some(aborted_verdict(&suite.cases[index], &e.to_string()));
            }
        }
    }
}

fn cancelled_verdict(case: &TestCase) -> CaseVerdict {
    CaseVerdict::new(
        case.name.clone(),
        case.group.clone(),
        case.method,
        None,
        vec![Failure::error(
            ErrorKind::Cancelled,
            "case to complete",
            "run cancelled",
        )],
        None,
    )
}

fn aborted_verdict(case: &TestCase, reason: &str) -> CaseVerdict {
    CaseVerdict::new(
        case.name.clone(),
        case.group.clone(),
        case.method,
        None,
        vec![Failure::error(ErrorKind::Aborted, "case to complete", reason)],
        None,
    )
}
