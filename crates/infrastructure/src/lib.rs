//! apicheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration, case files
//! and report rendering.

pub mod adapters;
pub mod cases;
pub mod config;
pub mod report;
pub mod serialization;

pub use adapters::{DEFAULT_USER_AGENT, ReqwestHttpClient, SystemClock};
pub use cases::{CaseFileError, CaseFormat, dump_suite, load_suite, parse_suite};
pub use config::{ConfigError, ConfigLoader, RunnerConfig};
pub use report::{ReportError, ReportFormat, render_case_list, render_report, render_text};
pub use serialization::{SerializationError, from_json, to_json_stable};
