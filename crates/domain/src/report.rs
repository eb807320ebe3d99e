//! Suite-level results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::verdict::CaseVerdict;

/// Results from running a suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite that was run.
    pub suite: String,
    /// Base URL the suite ran against.
    pub base_url: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the whole run in milliseconds.
    pub duration_ms: u64,
    /// Number of cases.
    pub total: usize,
    /// Number of passing cases.
    pub passed: usize,
    /// Number of failing cases (cancelled cases included).
    pub failed: usize,
    /// True when the run was cancelled before every case finished.
    pub cancelled: bool,
    /// Verdicts in case-table order.
    pub verdicts: Vec<CaseVerdict>,
}

impl SuiteReport {
    /// Create a new report from verdicts.
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        base_url: impl Into<String>,
        started_at: DateTime<Utc>,
        verdicts: Vec<CaseVerdict>,
        duration_ms: u64,
    ) -> Self {
        let total = verdicts.len();
        let passed = verdicts.iter().filter(|v| v.pass).count();
        let cancelled = verdicts.iter().any(CaseVerdict::is_cancelled);

        Self {
            suite: suite.into(),
            base_url: base_url.into(),
            started_at,
            duration_ms,
            total,
            passed,
            failed: total - passed,
            cancelled,
            verdicts,
        }
    }

    /// Check if every case passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Returns the failing verdicts.
    pub fn failures(&self) -> impl Iterator<Item = &CaseVerdict> {
        self.verdicts.iter().filter(|v| !v.pass)
    }
}
