//! apicheck Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP client, clock, cancellation)
//! - Case and suite orchestration
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod settings;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    CancellationReceiver, CancellationToken, Clock, HttpClient, HttpClientError, HttpFuture,
};
pub use settings::{DEFAULT_CONCURRENCY, DEFAULT_LATENCY_BUDGET_MS, RunSettings};
pub use use_cases::{RunContractCase, RunSuite};
