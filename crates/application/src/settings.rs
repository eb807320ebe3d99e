//! Run-wide settings shared by every case.

use apicheck_domain::request::DEFAULT_TIMEOUT_MS;
use serde::{Deserialize, Serialize};

use crate::{ApplicationError, ApplicationResult};

/// Default latency budget applied to cases without their own.
pub const DEFAULT_LATENCY_BUDGET_MS: u64 = 2_000;

/// Default number of cases in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Knobs for a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Maximum number of cases in flight.
    pub concurrency: usize,
    /// Timeout for cases without their own.
    pub timeout_ms: u64,
    /// Latency budget for cases without their own; `None` disables the check.
    pub latency_budget_ms: Option<u64>,
    /// Repeat GET cases and compare status and body shape.
    pub verify_idempotence: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            latency_budget_ms: Some(DEFAULT_LATENCY_BUDGET_MS),
            verify_idempotence: false,
        }
    }
}

impl RunSettings {
    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::InvalidSettings`] for zero concurrency or a
    /// zero timeout.
    pub fn validate(&self) -> ApplicationResult<()> {
        if self.concurrency == 0 {
            return Err(ApplicationError::InvalidSettings(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ApplicationError::InvalidSettings(
                "timeout must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RunSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.latency_budget_ms, Some(2_000));
        assert_eq!(settings.timeout_ms, 5_000);
    }

    #[test]
    fn test_zero_values_rejected() {
        let settings = RunSettings {
            concurrency: 0,
            ..RunSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::InvalidSettings(_))
        ));

        let settings = RunSettings {
            timeout_ms: 0,
            ..RunSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
