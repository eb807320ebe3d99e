//! System clock adapter

use apicheck_application::ports::Clock;
use chrono::{DateTime, Utc};

/// Clock backed by the system time; stamps the start of each report.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_is_after_2020() {
        let earliest = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single();
        assert!(earliest.is_some_and(|t| SystemClock::new().now() > t));
    }
}
