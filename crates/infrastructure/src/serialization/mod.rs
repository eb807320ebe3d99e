//! Deterministic serialization for reports and case files.
//!
//! JSON output uses 2-space indentation and a trailing newline so reports
//! diff cleanly between runs. Case files may also be YAML.

mod json;

pub use json::*;
