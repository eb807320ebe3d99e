//! apicheck Domain - Core contract-test types
//!
//! This crate defines the domain model for the apicheck runner: requests,
//! test cases, matchers, verdicts and reports.
//! All types here are pure Rust with no I/O dependencies.

pub mod case;
pub mod error;
pub mod matcher;
pub mod report;
pub mod request;
pub mod response;
pub mod verdict;

pub use case::{Suite, TestCase};
pub use error::{DomainError, DomainResult};
pub use matcher::{BodyMatcher, HeaderMatcher, JsonKind, LengthOperator};
pub use report::SuiteReport;
pub use request::{HttpMethod, PathTemplate, PreparedRequest, QueryParam, QueryParams};
pub use response::{DecodeError, ExecutionResult, RawResponse};
pub use verdict::{CaseVerdict, ErrorKind, Failure};
