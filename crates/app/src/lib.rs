//! apicheck - contract tests for JSON HTTP APIs
//!
//! Wires the domain, application and infrastructure crates into the
//! `apicheck` command and ships the built-in posts suite.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod suites;

pub use commands::Outcome;
