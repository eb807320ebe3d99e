//! Built-in suites.

pub mod posts;

use apicheck_domain::Suite;

/// Suite run when no case file is given.
#[must_use]
pub fn builtin() -> Suite {
    posts::suite()
}
