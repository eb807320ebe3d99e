//! HTTP response domain types

mod execution;
mod raw;

pub use execution::{DecodeError, ExecutionResult, preview};
pub use raw::{RawResponse, reason_phrase};
