//! Application use cases (business logic orchestration).

mod run_case;
mod run_suite;

pub use run_case::RunContractCase;
pub use run_suite::RunSuite;
